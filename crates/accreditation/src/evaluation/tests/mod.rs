mod common;
mod engine;
mod routing;
