// Resume review page: load a stored record, resolve its assets, pick a view.
// Storage access goes through crate::storage; rendering lives in crate::render.

pub mod loader;
pub mod object_url;
pub mod page;
pub mod view;
