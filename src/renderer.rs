//! Frame orchestration
//!
//! `RasterizationRenderer` wires settings, model, camera and the rasterizer
//! together: init once, then `render` / `save` / `update` per frame.

use std::path::Path;
use std::time::Instant;

use thiserror::Error;

use crate::error::RasterError;
use crate::output::{self, OutputError};
use crate::rasterizer::{Color, DrawStats, Mat4, Rasterizer, Resource, Vec3, Vertex};
use crate::settings::{Settings, SettingsError};
use crate::world::{Camera, Model, ModelError};

#[derive(Error, Debug)]
pub enum RendererError {
    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error("model: {0}")]
    Model(#[from] ModelError),

    #[error("settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("output: {0}")]
    Output(#[from] OutputError),
}

/// Lambert term plus ambient and emissive
pub fn lambert(vertex: &Vertex, to_light: Vec3) -> Color {
    let n_dot_l = vertex.normal.normalize().dot(to_light).max(0.0);
    Color::from_vec3(vertex.ambient + vertex.diffuse * n_dot_l + vertex.emissive)
}

pub struct RasterizationRenderer {
    settings: Settings,
    rasterizer: Rasterizer<Vertex, Color>,
    model: Model,
    camera: Camera,
    world: Mat4,
    frame: usize,
}

impl RasterizationRenderer {
    /// Load the configured model (or the built-in cube) and allocate targets
    pub fn init(settings: Settings) -> Result<Self, RendererError> {
        let model = match &settings.model_path {
            Some(path) => Model::load(path)?,
            None => {
                log::info!("No model configured, using built-in cube");
                Model::cube()
            }
        };
        Self::with_model(settings, model)
    }

    pub fn with_model(settings: Settings, model: Model) -> Result<Self, RendererError> {
        settings.validate()?;

        let mut rasterizer = Rasterizer::new();
        rasterizer.set_viewport(settings.width, settings.height)?;
        rasterizer.set_render_target(Resource::new(settings.width, settings.height)?);
        if settings.depth_test {
            rasterizer.set_depth_buffer(Some(Resource::filled(
                settings.width,
                settings.height,
                f32::MAX,
            )?));
        }
        rasterizer.set_settings(settings.raster_settings());

        log::info!(
            "Renderer initialized: {}x{}, depth test {}, cull {:?}",
            settings.width,
            settings.height,
            if settings.depth_test { "on" } else { "off" },
            settings.cull_mode
        );

        Ok(Self {
            camera: settings.camera(),
            world: settings.world_matrix(),
            settings,
            rasterizer,
            model,
            frame: 0,
        })
    }

    /// Render one frame into the bound target
    pub fn render(&mut self) -> Result<DrawStats, RendererError> {
        let start = Instant::now();
        self.rasterizer.clear_render_target(Color::BLACK)?;
        log::info!("Clearing took {:.3}ms", start.elapsed().as_secs_f64() * 1000.0);

        let world = self.world;
        let normals = world.normal_matrix();
        let view_projection = self.camera.view_projection();
        self.rasterizer.set_vertex_shader(move |position, vertex: &Vertex| {
            let world_position = world * position;
            let mut out = *vertex;
            out.position = world_position.xyz();
            out.normal = normals.transform_dir(vertex.normal).normalize();
            (view_projection * world_position, out)
        });

        let to_light = (-self.settings.light_direction).normalize();
        self.rasterizer
            .set_pixel_shader(move |vertex: &Vertex, _depth| lambert(vertex, to_light));

        let mut stats = DrawStats::default();
        for part in self.model.parts() {
            self.rasterizer.set_vertex_buffer(part.vertex_buffer().clone());
            self.rasterizer.set_index_buffer(part.index_buffer().clone());
            stats += self.rasterizer.draw(part.index_buffer().len(), 0)?;
        }

        log::info!(
            "Rendering frame {} took {:.3}ms ({} triangles, {} fragments)",
            self.frame,
            start.elapsed().as_secs_f64() * 1000.0,
            stats.triangles,
            stats.fragments
        );
        Ok(stats)
    }

    /// Write the current target to an image file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RendererError> {
        let target = self
            .rasterizer
            .render_target()
            .ok_or(RasterError::NotConfigured("render target"))?;
        output::save_resource(target, path)?;
        Ok(())
    }

    /// Advance to the next frame: orbit the camera around the model
    pub fn update(&mut self) {
        self.camera.orbit(self.model.center(), self.settings.orbit_step);
        self.frame += 1;
    }

    /// Release the render target and depth buffer. Later renders fail with
    /// `NotConfigured`.
    pub fn destroy(&mut self) -> Option<Resource<Color>> {
        self.rasterizer.take_depth_buffer();
        let target = self.rasterizer.take_render_target();
        log::debug!("Renderer destroyed after {} frames", self.frame);
        target
    }

    pub fn render_target(&self) -> Option<&Resource<Color>> {
        self.rasterizer.render_target()
    }

    pub fn depth_buffer(&self) -> Option<&Resource<f32>> {
        self.rasterizer.depth_buffer()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Replace the model transform. Normals follow through its inverse-transpose.
    pub fn set_world_matrix(&mut self, world: Mat4) {
        self.world = world;
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn frame(&self) -> usize {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{CullMode, Vec2};

    fn small_settings() -> Settings {
        Settings {
            width: 48,
            height: 32,
            camera_position: Vec3::new(0.0, 0.0, 5.0),
            camera_phi: 0.0,
            light_direction: Vec3::new(0.0, 0.0, -1.0),
            ..Default::default()
        }
    }

    fn lit_pixels(r: &RasterizationRenderer) -> usize {
        r.render_target()
            .unwrap()
            .data()
            .iter()
            .filter(|c| **c != Color::BLACK)
            .count()
    }

    #[test]
    fn test_lambert() {
        let v = Vertex::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 2.0), Vec2::ZERO);
        assert_eq!(lambert(&v, Vec3::new(0.0, 0.0, 1.0)), Color::WHITE);
        assert_eq!(lambert(&v, Vec3::new(0.0, 0.0, -1.0)), Color::BLACK);

        let mut glow = v;
        glow.emissive = Vec3::new(0.0, 1.0, 0.0);
        glow.diffuse = Vec3::ZERO;
        assert_eq!(lambert(&glow, Vec3::new(0.0, 0.0, -1.0)), Color::GREEN);
    }

    #[test]
    fn test_cube_renders_in_center() {
        let mut r = RasterizationRenderer::with_model(small_settings(), Model::cube()).unwrap();
        let stats = r.render().unwrap();
        assert_eq!(stats.triangles, 12);
        assert!(stats.fragments > 0);

        let target = r.render_target().unwrap();
        assert_ne!(target.get(24, 16).unwrap(), Color::BLACK);
        assert_eq!(target.get(0, 0).unwrap(), Color::BLACK);
    }

    #[test]
    fn test_back_face_culling_keeps_visible_faces() {
        let mut depth_only = RasterizationRenderer::with_model(small_settings(), Model::cube()).unwrap();
        let all = depth_only.render().unwrap();

        let culled_settings = Settings {
            cull_mode: CullMode::Back,
            ..small_settings()
        };
        let mut culled = RasterizationRenderer::with_model(culled_settings, Model::cube()).unwrap();
        let stats = culled.render().unwrap();
        assert!(stats.culled > 0);
        // Hidden faces lose the depth test without culling, so compare
        // everything that reached the depth test
        assert_eq!(stats.depth_rejected, 0);
        assert!(all.depth_rejected > 0);
        assert!(stats.fragments + stats.depth_rejected < all.fragments + all.depth_rejected);
        assert_eq!(
            depth_only.render_target().unwrap().get(24, 16).unwrap(),
            culled.render_target().unwrap().get(24, 16).unwrap()
        );
    }

    #[test]
    fn test_render_is_repeatable() {
        let mut r = RasterizationRenderer::with_model(small_settings(), Model::cube()).unwrap();
        r.render().unwrap();
        let first = r.render_target().unwrap().clone();
        r.render().unwrap();
        assert_eq!(&first, r.render_target().unwrap());
    }

    #[test]
    fn test_update_orbits_camera() {
        let mut r = RasterizationRenderer::with_model(small_settings(), Model::cube()).unwrap();
        let before = r.camera().position;
        r.update();
        assert_eq!(r.frame(), 1);
        assert_ne!(r.camera().position, before);
        r.render().unwrap();
        assert!(lit_pixels(&r) > 0);
    }

    #[test]
    fn test_destroy_releases_target() {
        let mut r = RasterizationRenderer::with_model(small_settings(), Model::cube()).unwrap();
        let target = r.destroy().unwrap();
        assert_eq!(target.dimensions(), (48, 32));
        assert!(r.depth_buffer().is_none());
        assert!(matches!(
            r.render(),
            Err(RendererError::Raster(RasterError::NotConfigured("render target")))
        ));
    }

    #[test]
    fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let mut r = RasterizationRenderer::with_model(small_settings(), Model::quad()).unwrap();
        r.render().unwrap();
        r.save(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_rotated_quad_faces_away_from_light() {
        let mut r = RasterizationRenderer::with_model(small_settings(), Model::quad()).unwrap();
        r.render().unwrap();
        assert_eq!(r.render_target().unwrap().get(24, 16).unwrap(), Color::WHITE);

        r.set_world_matrix(Mat4::rotation(Vec3::new(0.0, 180.0, 0.0)));
        r.render().unwrap();
        assert_eq!(r.render_target().unwrap().get(24, 16).unwrap(), Color::BLACK);
    }

    #[test]
    fn test_model_rotation_from_settings_turns_normals() {
        let settings = Settings {
            model_rotation: Vec3::new(0.0, 60.0, 0.0),
            ..small_settings()
        };
        let mut r = RasterizationRenderer::with_model(settings, Model::quad()).unwrap();
        r.render().unwrap();
        // cos(60) of full white
        let c = r.render_target().unwrap().get(24, 16).unwrap();
        assert!((126..=129).contains(&c.r), "{c:?}");
        assert_eq!((c.r, c.r), (c.g, c.b));
    }

    #[test]
    fn test_stretched_quad_keeps_its_normal() {
        let settings = Settings {
            model_scale: Vec3::new(3.0, 0.5, 1.0),
            ..small_settings()
        };
        let mut r = RasterizationRenderer::with_model(settings, Model::quad()).unwrap();
        r.render().unwrap();
        assert_eq!(r.render_target().unwrap().get(24, 16).unwrap(), Color::WHITE);
    }

    #[test]
    fn test_model_inside_near_plane_is_not_drawn() {
        let settings = Settings {
            camera_position: Vec3::new(0.0, 0.0, 0.5),
            camera_z_near: 1.0,
            ..small_settings()
        };
        let mut r = RasterizationRenderer::with_model(settings, Model::quad()).unwrap();
        let stats = r.render().unwrap();
        assert_eq!(stats.clipped, 2);
        assert_eq!(stats.fragments, 0);
        assert_eq!(lit_pixels(&r), 0);
    }
}
