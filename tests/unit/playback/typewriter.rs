use super::*;

fn loaded(text: &str, rate: u32) -> Typewriter {
    let mut tw = Typewriter::new(rate).unwrap();
    tw.load(text);
    tw
}

#[test]
fn two_chars_at_rate_30_complete_after_two_ticks() {
    let mut tw = loaded("ab", 30);
    assert_eq!(tw.chars_per_tick(), 1);
    assert_eq!(tw.tick_interval().as_millis(), 33);

    assert!(tw.start());
    assert_eq!(tw.tick(), Some("a"));
    assert!(tw.is_running());
    assert_eq!(tw.tick(), Some("ab"));
    assert_eq!(tw.cursor(), 2);
    assert!(!tw.is_running());
    assert_eq!(tw.tick(), None);
}

#[test]
fn high_rates_batch_characters() {
    let mut tw = loaded("abcdefghij", 200);
    assert_eq!(tw.chars_per_tick(), 7);
    tw.start();
    assert_eq!(tw.tick(), Some("abcdefg"));
    // The final tick is capped at the remaining length.
    assert_eq!(tw.tick(), Some("abcdefghij"));
    assert!(!tw.is_running());

    tw.set_rate(31).unwrap();
    assert_eq!(tw.chars_per_tick(), 2);
    tw.set_rate(10).unwrap();
    assert_eq!(tw.chars_per_tick(), 1);
}

#[test]
fn start_at_end_restarts_from_zero() {
    let mut tw = loaded("xy", 30);
    tw.start();
    tw.tick();
    tw.tick();
    assert!(tw.is_complete());

    assert!(tw.start());
    assert_eq!(tw.cursor(), 0);
    assert_eq!(tw.prefix(), "");
    assert_eq!(tw.tick(), Some("x"));
}

#[test]
fn pause_keeps_cursor_and_reset_clears_it() {
    let mut tw = loaded("hello", 30);
    tw.start();
    tw.tick();
    tw.tick();
    tw.pause();
    assert_eq!(tw.tick(), None);
    assert_eq!(tw.prefix(), "he");

    tw.start();
    assert_eq!(tw.tick(), Some("hel"));

    tw.reset();
    assert_eq!(tw.cursor(), 0);
    assert_eq!(tw.prefix(), "");
    assert!(tw.is_idle());
}

#[test]
fn set_rate_keeps_cursor_and_rejects_zero() {
    let mut tw = loaded("hello", 30);
    tw.start();
    tw.tick();
    tw.set_rate(120).unwrap();
    assert_eq!(tw.cursor(), 1);
    assert!(matches!(tw.set_rate(0), Err(PlaybackError::Input(_))));
    assert_eq!(tw.rate(), 120);
    assert!(Typewriter::new(0).is_err());
}

#[test]
fn load_always_resets() {
    let mut tw = loaded("first file", 100);
    tw.start();
    tw.tick();
    assert!(tw.is_running());

    tw.load("second");
    assert_eq!(tw.cursor(), 0);
    assert_eq!(tw.prefix(), "");
    assert!(!tw.is_running());
    assert_eq!(tw.len(), 6);
}

#[test]
fn empty_source_never_starts() {
    let mut tw = Typewriter::new(30).unwrap();
    assert!(!tw.start());
    assert!(!tw.is_running());
    assert_eq!(tw.tick(), None);
    assert_eq!(tw.state().progress(), 0.0);
}

#[test]
fn cursor_counts_characters_not_bytes() {
    let mut tw = loaded("héllo→", 30);
    assert_eq!(tw.len(), 6);
    tw.start();
    tw.tick();
    tw.tick();
    assert_eq!(tw.prefix(), "hé");
    while tw.tick().is_some() {}
    assert_eq!(tw.prefix(), "héllo→");
}

#[test]
fn cursor_stays_in_bounds_for_arbitrary_sequences() {
    // Deterministic LCG so the sequence is reproducible without extra dependencies.
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = || {
        seed = seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (seed >> 33) as u32
    };

    for text in ["", "a", "fn main() {}\n", "line one\nline two\nline three\n"] {
        let mut tw = loaded(text, 30);
        let mut last = 0usize;
        for _ in 0..500 {
            let was_running = tw.is_running();
            match next() % 5 {
                0 => {
                    tw.start();
                }
                1 => tw.pause(),
                2 => tw.reset(),
                3 => tw.set_rate(1 + next() % 250).unwrap(),
                _ => {
                    tw.tick();
                    if was_running {
                        assert!(tw.cursor() >= last, "cursor moved backwards while running");
                    }
                }
            }
            assert!(tw.cursor() <= tw.len());
            assert_eq!(tw.prefix().chars().count(), tw.cursor());
            last = tw.cursor();
        }
    }
}
