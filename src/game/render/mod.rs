/// Software renderer - ray casting into a paletted frame buffer.
///
/// This module is organized into:
/// - **raycaster**: One ray per screen strip, fish-eye corrected
/// - **projector**: Ray distance to wall strip, and strip drawing
/// - **framebuffer**: The fill-rectangle primitive, page flipping and palette
/// - **minimap**: Top-down map overlay

use bevy::diagnostic::FrameCount;
use bevy::prelude::*;
use tilecast_macros::profile;

use crate::game::angle::SinLut;
use crate::game::config::{GameConfig, GameConfigHandle, setup_world};
use crate::game::simulation::{FrameSet, PlayerState, SimConfig, ViewSettings};
use crate::game::world::WorldGrid;
use crate::profile_log;

pub mod raycaster;
pub mod projector;
pub mod framebuffer;
pub mod minimap;

pub use framebuffer::{FrameBuffer, Palette, RenderTarget};
pub use raycaster::{RayHit, WallFace};

pub struct ViewPlugin;

impl Plugin for ViewPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Palette>();

        app.add_systems(Startup, setup_framebuffer.after(setup_world));
        app.add_systems(Update, (
            apply_runtime_palette.run_if(resource_exists::<GameConfigHandle>),
            render_view
                .in_set(FrameSet::Render)
                .run_if(resource_exists::<FrameBuffer>)
                .run_if(resource_exists::<PlayerState>),
            present_frame
                .in_set(FrameSet::Present)
                .run_if(resource_exists::<FrameBuffer>),
        ));
    }
}

/// Size the frame buffer from the validated config. Nothing to do when the
/// world failed to build; the app is already exiting.
pub fn setup_framebuffer(mut commands: Commands, config: Option<Res<SimConfig>>) {
    let Some(config) = config else { return };
    info!("Frame buffer {}x{}, {} px columns", config.screen_width, config.screen_height, config.column_width);
    commands.insert_resource(FrameBuffer::new(config.screen_width, config.screen_height));
}

/// Replace the palette whenever the runtime config (re)loads with one.
fn apply_runtime_palette(
    config_handle: Res<GameConfigHandle>,
    game_configs: Res<Assets<GameConfig>>,
    mut events: MessageReader<AssetEvent<GameConfig>>,
    mut palette: ResMut<Palette>,
) {
    for event in events.read() {
        if !(event.is_modified(config_handle.0.id()) || event.is_loaded_with_dependencies(config_handle.0.id())) {
            continue;
        }
        let Some(config) = game_configs.get(&config_handle.0) else { continue };
        if config.palette.is_empty() {
            continue;
        }
        *palette = Palette::from_rgb15(&config.palette);
        info!("Palette updated ({} colors)", palette.len());
    }
}

/// Cast the view and draw it, plus the minimap, into the back page.
#[profile(4)]
pub fn render_view(
    grid: Res<WorldGrid>,
    player: Res<PlayerState>,
    trig: Res<SinLut>,
    config: Res<SimConfig>,
    view: Res<ViewSettings>,
    mut framebuffer: ResMut<FrameBuffer>,
    mut rays: Local<Vec<RayHit>>,
    #[allow(unused_variables)] frame: Res<FrameCount>,
) {
    raycaster::cast_view(&player, &grid, trig.as_ref(), &config, &mut rays);

    let target = &mut *framebuffer;
    for ray in rays.iter() {
        let slice = projector::project(ray, &config);
        let x0 = ray.column as i32;
        let x1 = (x0 + config.column_width as i32).min(config.screen_width as i32);
        projector::draw_column(target, x0, x1, slice.as_ref());
    }

    if view.show_minimap {
        minimap::draw_minimap(target, &grid, &player, trig.as_ref(), &config);
    }

    profile_log!(
        frame,
        "[RENDER] Rays: {} | Walls hit: {}",
        rays.len(),
        rays.iter().filter(|r| r.hit.is_some()).count()
    );
}

/// Flip pages so the frame just drawn is displayed.
pub fn present_frame(mut framebuffer: ResMut<FrameBuffer>) {
    framebuffer.present();
}
