//! Score one journal entry and print the stress report

fn main() {
    let json = r#"{
        "text": "I am stressed and overwhelmed by this urgent deadline",
        "keystroke_timestamps": [0, 200, 430, 900, 1200, 1550],
        "biometrics": {
            "touch_pressure": [80, 85],
            "touch_duration": [250, 300],
            "swipe_velocity": [150, 160]
        },
        "observed_at": "2024-01-15T14:00:00Z"
    }"#;

    match mindsalary_core::sample_to_report(json) {
        Ok(report) => print!("{report}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
