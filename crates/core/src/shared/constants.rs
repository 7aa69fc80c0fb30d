/// Beam width used for every transcription; not caller-configurable.
pub const BEAM_SIZE: usize = 5;

/// VAD sensitivity. Low enough to pick up speech over loud crowd noise
/// without latching onto the noise floor itself.
pub const VAD_THRESHOLD: f32 = 0.15;

/// Minimum silence gap before VAD cuts a segment. Short, so rapid speech
/// is split at every breath pause.
pub const VAD_MIN_SILENCE_MS: u32 = 300;

/// Padding kept around detected speech so segment edges don't clip words.
pub const VAD_SPEECH_PAD_MS: u32 = 200;

pub const MODEL_WEIGHTS_FILENAME: &str = "model.bin";
pub const MODEL_CONFIG_FILENAME: &str = "config.json";

pub const DEVICE_ENV_VAR: &str = "VOXLINE_DEVICE";
pub const DEFAULT_DEVICE: &str = "cuda";

pub const COMPUTE_TYPE_ENV_VAR: &str = "VOXLINE_COMPUTE_TYPE";
pub const DEFAULT_COMPUTE_TYPE: &str = "float16";

/// Sample rate the engine consumes; decoded audio is resampled to this.
pub const ENGINE_SAMPLE_RATE: u32 = 16000;
