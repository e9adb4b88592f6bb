//! Setup guide for enabling USB debugging.

use serde_json::json;

use crate::output::OutputControls;

const STEPS: &[&str] = &[
    "On the phone: Settings > About phone > tap Build number 7 times to unlock Developer options",
    "Settings > Developer options > enable USB debugging",
    "Connect the phone over USB and accept the \"Allow USB debugging?\" prompt",
    "Install Android Platform Tools (https://developer.android.com/tools/releases/platform-tools) and put adb on PATH, or pass --adb <path>",
    "Verify with `adb devices`: the phone should be listed as \"device\", not \"unauthorized\"",
];

pub fn run(output: &OutputControls) {
    if output.json {
        output.print(&json!({ "steps": STEPS }));
        return;
    }

    println!("Setup: enable USB debugging");
    println!("{}", "-".repeat(60));
    for (i, step) in STEPS.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
}
