//! Replay a simulated 6 x 1000 m session and print every transition

fn main() {
    let day = r#"{
        "schema_version": "stride.training_day.v1",
        "day": 12,
        "title": "6 x 1000 m",
        "date": "2024-03-05",
        "workout": {
            "type": "interval",
            "work": { "distance_km": 1.0, "pace": "4:00", "description": "1000 m hard" },
            "recovery": { "distance_m": 400, "heart_rate": { "min": 120, "max": 140 }, "description": "easy jog" },
            "repeats": 6
        }
    }"#;

    // ~1 Hz GPS at 4 m/s, with a little jitter every tenth reading
    let samples: String = (0..=2200)
        .map(|second| {
            let jitter = if second % 10 == 0 { -1.5 } else { 0.0 };
            format!(
                "{{\"distance_m\": {:.1}, \"speed_mps\": 4.0}}\n",
                (second as f64 * 4.0 + jitter).max(0.0)
            )
        })
        .collect();

    match synheart_stride::replay_ndjson(day, &samples) {
        Ok(lines) => {
            for line in lines.iter().filter(|l| !l.contains("\"events\":[]")) {
                println!("{line}");
            }
        }
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
