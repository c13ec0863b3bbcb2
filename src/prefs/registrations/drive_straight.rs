//! Heading-hold gains and cruise speed for the drive-straight command

use crate::prefs::{DoubleValue, PrefDefinition};

pub const DEFAULT_SPEED: DoubleValue = DoubleValue::new("DriveStraight/DefaultSpeed", 1.0)
    .described("Translation speed when no speed or distance target is given");
pub const P: DoubleValue = DoubleValue::new("DriveStraight/P", 0.081)
    .described("Heading controller proportional gain");
pub const I: DoubleValue = DoubleValue::new("DriveStraight/I", 0.00016)
    .described("Heading controller integral gain");
pub const D: DoubleValue = DoubleValue::new("DriveStraight/D", 0.0072)
    .described("Heading controller derivative gain");

pub fn definitions() -> Vec<PrefDefinition> {
    vec![
        DEFAULT_SPEED.definition(),
        P.definition(),
        I.definition(),
        D.definition(),
    ]
}
