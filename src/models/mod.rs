mod project;

pub use project::{non_empty, ItemPayload, ListItem, NewProject, Project};
