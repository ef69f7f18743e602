pub mod builder;
pub mod config;
pub mod gesture;
pub mod hit;
pub mod input;
pub mod shortcuts;
pub mod tools;

pub use builder::{BindingChange, BuilderEngine, FieldMutation, FieldPatch, InputOutcome, ZOrder};
pub use config::BuilderConfig;
pub use gesture::{Corner, DragSession, Gesture, GestureKind};
pub use hit::{Hit, hit_test};
pub use input::{InputEvent, Modifiers};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use tools::{PlaceTool, SelectTool, Tool, ToolContext, ToolKind, tool_by_name};
