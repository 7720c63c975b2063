//! Path and URL helpers shared by the publisher and the registrar.
//!
//! Both helpers work on plain strings and never touch the filesystem, so the registrar can
//! build its `data-main` URL without knowing how the directory was published.

mod app_file;
mod url;

pub use app_file::normalize_app_file;
pub use url::join_url;
