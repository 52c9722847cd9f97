pub mod accumulator;
pub mod collection;
pub mod fetcher;
pub mod sort_search;
