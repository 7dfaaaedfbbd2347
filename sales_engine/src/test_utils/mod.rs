pub mod prepare_env;
mod scripted_feed;

pub use scripted_feed::ScriptedFeed;
