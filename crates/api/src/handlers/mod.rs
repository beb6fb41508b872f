pub mod entries;
pub mod feeds;
pub mod pages;
