pub mod code_pane;
pub mod lesson_panel;
pub mod output_pane;
pub mod sidebar_tree;
