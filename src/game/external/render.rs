use bevy::color::Color;
use bevy::math::{Mat4, Vec3};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(pub u32);

pub trait RenderSink {
    fn load_model(&mut self, path: &str) -> ModelId;
    fn draw(&mut self, model: ModelId, transform: Mat4);
    fn draw_line(&mut self, from: Vec3, to: Vec3, color: Color);
    fn draw_text(&mut self, text: &str, position: Vec3, color: Color);
    fn set_camera_view(&mut self, view: Mat4);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Model { model: ModelId, transform: Mat4 },
    Line { from: Vec3, to: Vec3, color: Color },
    Text { text: String, position: Vec3, color: Color },
}

/// One frame of draw output. Loaded models survive [`DrawList::clear`].
#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
    camera_view: Option<Mat4>,
    model_paths: Vec<String>,
    model_ids: FxHashMap<String, ModelId>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.camera_view = None;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn camera_view(&self) -> Option<Mat4> {
        self.camera_view
    }

    pub fn model_path(&self, model: ModelId) -> Option<&str> {
        self.model_paths.get(model.0 as usize).map(String::as_str)
    }

    pub fn lines(&self) -> impl Iterator<Item = (Vec3, Vec3, Color)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Line { from, to, color } => Some((*from, *to, *color)),
            _ => None,
        })
    }
}

impl RenderSink for DrawList {
    fn load_model(&mut self, path: &str) -> ModelId {
        if let Some(id) = self.model_ids.get(path) {
            return *id;
        }
        let id = ModelId(self.model_paths.len() as u32);
        self.model_paths.push(path.to_owned());
        self.model_ids.insert(path.to_owned(), id);
        id
    }

    fn draw(&mut self, model: ModelId, transform: Mat4) {
        self.commands.push(DrawCommand::Model { model, transform });
    }

    fn draw_line(&mut self, from: Vec3, to: Vec3, color: Color) {
        self.commands.push(DrawCommand::Line { from, to, color });
    }

    fn draw_text(&mut self, text: &str, position: Vec3, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            position,
            color,
        });
    }

    fn set_camera_view(&mut self, view: Mat4) {
        self.camera_view = Some(view);
    }
}
