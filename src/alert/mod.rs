/// ON/OFF state tracking and transition detection.

pub mod transitions;
