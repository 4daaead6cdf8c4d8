//! notes-pipeline: publish a Markdown notes repository into a Hexo blog
//!
//! `sync` selects eligible notes and images and copies them into the site.
//! `process` rewrites the copied articles in place: image links, front matter
//! (title, dates from git history, tags, categories, covers) and template
//! syntax that Hexo would otherwise try to render.

pub mod article;
pub mod cli;
pub mod config;
pub mod cover;
pub mod domain;
pub mod error;
pub mod history;
pub mod process;
pub mod scan;
pub mod site;
pub mod sync;
pub mod tags;
pub mod utils;
