/// Shows the frame buffer's front page in the window.
///
/// The page is converted through the palette into an RGBA image that a
/// single scaled sprite displays with nearest filtering, so every frame
/// buffer pixel stays a crisp `display_scale` square.

use bevy::asset::RenderAssetUsages;
use bevy::image::ImageSampler;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use tilecast_macros::profile;

use crate::game::config::InitialConfig;
use crate::game::render::{FrameBuffer, Palette, RenderTarget};
use crate::game::simulation::FrameSet;

pub struct DisplayPlugin;

impl Plugin for DisplayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_display.after(crate::game::render::setup_framebuffer))
           .add_systems(Update, upload_front_page
                .after(FrameSet::Present)
                .run_if(resource_exists::<DisplayImage>)
                .run_if(resource_exists::<FrameBuffer>));
    }
}

/// The image the sprite shows.
#[derive(Resource)]
pub struct DisplayImage(pub Handle<Image>);

fn setup_display(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    framebuffer: Option<Res<FrameBuffer>>,
    initial: Res<InitialConfig>,
) {
    let Some(framebuffer) = framebuffer else { return };
    let (width, height) = (framebuffer.width(), framebuffer.height());

    let mut image = Image::new_fill(
        Extent3d { width, height, depth_or_array_layers: 1 },
        TextureDimension::D2,
        &[0, 0, 0, 255],
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    );
    image.sampler = ImageSampler::nearest();
    let handle = images.add(image);

    let scale = initial.display_scale.max(1) as f32;
    commands.spawn(Camera2d);
    commands.spawn(Sprite {
        image: handle.clone(),
        custom_size: Some(Vec2::new(width as f32 * scale, height as f32 * scale)),
        ..default()
    });
    commands.insert_resource(DisplayImage(handle));

    info!("Display {}x{} at {}x scale", width, height, initial.display_scale);
}

/// Copy the presented page through the palette into the displayed image.
#[profile(2)]
fn upload_front_page(
    framebuffer: Res<FrameBuffer>,
    palette: Res<Palette>,
    display: Res<DisplayImage>,
    mut images: ResMut<Assets<Image>>,
) {
    let Some(image) = images.get_mut(&display.0) else { return };
    let Some(data) = image.data.as_mut() else { return };
    palette.write_rgba8(framebuffer.front(), data);
}
