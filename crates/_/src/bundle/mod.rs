pub mod events;
pub mod fan_in;
pub mod id;
pub mod loading;
pub mod path;
pub mod registry;
pub mod subscription;
