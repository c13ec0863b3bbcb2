//! Driver control scheme for teleop

use crate::prefs::{BooleanValue, PrefDefinition};

pub const USING_TANK_CONTROL: BooleanValue =
    BooleanValue::new("DriveManually/UsingTankControl", true)
        .described("Tank drive when true, arcade drive when false");
pub const SQUARE_CONTROL_INPUTS: BooleanValue =
    BooleanValue::new("DriveManually/SquareControlInputs", true)
        .described("Square joystick inputs for finer low-speed control");

pub fn definitions() -> Vec<PrefDefinition> {
    vec![
        USING_TANK_CONTROL.definition(),
        SQUARE_CONTROL_INPUTS.definition(),
    ]
}
