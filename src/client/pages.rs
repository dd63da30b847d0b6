//! Pages of the blog UI and where they live.

use crate::client::Route;

/// What the UI renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Post,
    CreatePost,
    EditPost,
    Dashboard,
    NotFound,
}

/// Route table of the UI, [`Page::NotFound`] being the fallback.
///
/// `Post` and `EditPost` bind `postId`.
pub fn routes() -> Result<Vec<Route<Page>>, regex_lite::Error> {
    Ok(vec![
        Route::new("/", Page::Home)?,
        Route::new("/post/:postId", Page::Post)?,
        Route::new("/create-post", Page::CreatePost)?,
        Route::new("/edit-post/:postId", Page::EditPost)?,
        Route::new("/dashboard", Page::Dashboard)?,
        Route::otherwise(Page::NotFound),
    ])
}
