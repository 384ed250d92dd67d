//=========================================================================
// Persisted Key Layout
//=========================================================================
//
// Collection navigators (stack, wizard, composite stack):
//   size, {i}_class, {i}_state          (+ active_index for the wizard)
//
// Single-slot navigators:
//   scene:class / scene:state           (replacing, single scene)
//   navigator:class / navigator:state   (composite replacing)
//
//=========================================================================

pub const SIZE: &str = "size";
pub const ACTIVE_INDEX: &str = "active_index";

pub const SCENE_CLASS: &str = "scene:class";
pub const SCENE_STATE: &str = "scene:state";

pub const NAVIGATOR_CLASS: &str = "navigator:class";
pub const NAVIGATOR_STATE: &str = "navigator:state";

/// Key holding the class identifier of the element at `index`.
pub fn class_at(index: usize) -> String {
    format!("{index}_class")
}

/// Key holding the saved state of the element at `index`.
pub fn state_at(index: usize) -> String {
    format!("{index}_state")
}
