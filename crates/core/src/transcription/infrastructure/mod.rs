pub mod model_assets;
pub mod whisper_engine;
