use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Animation", inline)]
#[serde(default)]
/// Timestep playback and procedural wobble.
pub struct AnimationOptions {
    /// Play through timesteps and wobble points over time.
    #[schemars(title = "Procedural Animation")]
    pub animate: bool,
    /// Timesteps per second, and wobble frequency.
    #[schemars(title = "Frequency", range(min = 1.0, max = 256.0), extend("step" = 1.0))]
    pub frequency: f32,
    /// Wobble amplitude.
    #[schemars(title = "Amplitude", range(min = 1.0, max = 32.0), extend("step" = 0.5))]
    pub amplitude: f32,
    /// Timestep shown while not animating (clamped to the scene).
    #[schemars(title = "Timestep")]
    pub timestep: usize,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            animate: false,
            frequency: 1.0,
            amplitude: 1.0,
            timestep: 0,
        }
    }
}
