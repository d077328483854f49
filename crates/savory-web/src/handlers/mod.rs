pub mod board;
pub mod home;
pub mod signin;

use savory_core::{board as directory, post::PostSummary, store::BoardStore};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// `?page=N`; absent means the first page.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
  pub page: Option<u64>,
}

impl PageQuery {
  pub fn page(&self) -> u64 { self.page.unwrap_or(1) }
}

/// One page of the board with its navigation window.
#[derive(Debug, Serialize)]
pub struct BoardPage {
  pub page:  u64,
  pub posts: Vec<PostSummary>,
  pub pages: Vec<u64>,
  pub total: u64,
}

pub(crate) async fn board_page<S: BoardStore>(store: &S, page: u64) -> Result<BoardPage> {
  let posts = directory::list(store, page).await?;
  let total = directory::count(store).await?;
  Ok(BoardPage {
    page,
    posts,
    pages: savory_core::pagination::board_window(page, total),
    total,
  })
}
