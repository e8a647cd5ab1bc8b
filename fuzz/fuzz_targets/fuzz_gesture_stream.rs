#![no_main]

use arbitrary::Arbitrary;
use dragsort_core::{
    CaptureCommand, GestureConfig, GestureTracker, PointerButton, PointerPosition,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Signal {
    Down { index: u8, pointer: u8, secondary: bool, y: i16 },
    Acquired { pointer: u8 },
    Move { pointer: u8, y: i16 },
    Up { pointer: u8, y: i16 },
    Cancel { pointer: Option<u8> },
    Leave { pointer: u8 },
    Lost { pointer: u8 },
    Blur,
    Hidden,
}

fuzz_target!(|signals: Vec<Signal>| {
    let mut tracker = GestureTracker::new(GestureConfig::default());
    let mut capture_held = false;
    let mut last_sequence = 0u64;

    for signal in signals {
        let before = tracker.active_pointer_id();
        let acquired = matches!(signal, Signal::Acquired { .. });
        let dispatch = match signal {
            Signal::Down { index, pointer, secondary, y } => {
                let button = if secondary {
                    PointerButton::Secondary
                } else {
                    PointerButton::Primary
                };
                tracker.pointer_down(
                    usize::from(index),
                    u32::from(pointer),
                    button,
                    PointerPosition::new(0.0, f64::from(y)),
                )
            }
            Signal::Acquired { pointer } => tracker.capture_acquired(u32::from(pointer)),
            Signal::Move { pointer, y } => {
                tracker.pointer_move(u32::from(pointer), PointerPosition::new(0.0, f64::from(y)))
            }
            Signal::Up { pointer, y } => tracker.pointer_up(
                u32::from(pointer),
                PointerButton::Primary,
                PointerPosition::new(0.0, f64::from(y)),
            ),
            Signal::Cancel { pointer } => tracker.pointer_cancel(pointer.map(u32::from)),
            Signal::Leave { pointer } => tracker.pointer_leave(u32::from(pointer)),
            Signal::Lost { pointer } => tracker.lost_pointer_capture(u32::from(pointer)),
            Signal::Blur => tracker.blur(),
            Signal::Hidden => tracker.visibility_hidden(),
        };

        assert_eq!(tracker.is_active(), tracker.active_pointer_id().is_some());
        if dispatch.is_ignored() {
            assert!(dispatch.update.is_none() && dispatch.capture_command.is_none());
            assert_eq!(tracker.active_pointer_id(), before);
            continue;
        }
        if let Some(sequence) = dispatch.log.sequence {
            assert!(sequence > last_sequence, "sequence must increase");
            last_sequence = sequence;
        }
        if let Some(CaptureCommand::Release { pointer_id }) = dispatch.capture_command {
            assert!(capture_held, "released a capture never held");
            assert_eq!(Some(pointer_id), before);
            capture_held = false;
        }
        if acquired {
            capture_held = true;
        }
        if dispatch.update.is_some_and(|update| !update.active) {
            assert!(!tracker.is_active());
            capture_held = false;
        }
    }
});
