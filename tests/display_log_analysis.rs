#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use cortical_mapping::{
        display_log::{
            parse_display_log, DisplayFrame, DisplayLog, Monitor, Presentation,
            Stimulation, SweepDirection, ALL_DIRECTION_SWEEP_STIMULUS,
        },
        error::{ConfigurationError, MappingError, TimingError},
    };


    const GAP_FRAMES: usize = 6;
    const SWEEP_FRAMES: usize = 24;

    // every direction uses its own block of the sweep table, positions increase with the index
    fn direction_frames(direction: SweepDirection, block: usize) -> Vec<DisplayFrame> {
        let gap = (0..GAP_FRAMES).map(|_| DisplayFrame {
            is_display: 0,
            square_polarity: 0.,
            sweep_index: None,
            indicator_color: -1.,
            direction,
        });

        let sweep = (0..SWEEP_FRAMES).map(move |k| DisplayFrame {
            is_display: 1,
            square_polarity: if k % 2 == 0 { 1. } else { -1. },
            sweep_index: Some(block * SWEEP_FRAMES + k),
            indicator_color: 1.,
            direction,
        });

        gap.chain(sweep).collect()
    }

    fn build_log(
        directions: &[SweepDirection],
        iteration: usize,
        display_iteration: usize,
        refresh_rate: f64,
        frame_interval: f64,
    ) -> DisplayLog {
        let mut one_iteration: Vec<DisplayFrame> = Vec::new();
        for (block, direction) in directions.iter().enumerate() {
            for _ in 0..iteration {
                one_iteration.extend(direction_frames(*direction, block));
            }
        }

        let display_frames: Vec<DisplayFrame> = (0..display_iteration)
            .flat_map(|_| one_iteration.clone())
            .collect();
        let time_stamp: Vec<f64> = (0..display_frames.len())
            .map(|i| i as f64 * frame_interval)
            .collect();

        DisplayLog {
            stimulation: Stimulation {
                stim_name: String::from(ALL_DIRECTION_SWEEP_STIMULUS),
                pre_gap_dur: None,
                pre_gap_frame_num: Some(GAP_FRAMES as u64),
                iteration,
                sweep_table: (0..directions.len() * SWEEP_FRAMES).map(|i| i as f64).collect(),
            },
            presentation: Presentation {
                display_order: 1,
                display_iteration,
                time_stamp,
                display_frames,
            },
            monitor: Monitor { refresh_rate },
        }
    }

    fn default_log() -> DisplayLog {
        build_log(&SweepDirection::ALL, 1, 2, 60., 1. / 60.)
    }

    #[test]
    pub fn test_sweep_information() -> Result<(), MappingError> {
        let display_info = parse_display_log(&default_log())?;

        assert_eq!(display_info.len(), 4);

        let expected_indices = [
            (SweepDirection::BottomToUp, vec![0, 4]),
            (SweepDirection::UpToBottom, vec![1, 5]),
            (SweepDirection::LeftToRight, vec![2, 6]),
            (SweepDirection::RightToLeft, vec![3, 7]),
        ];

        for (direction, indices) in expected_indices {
            let info = &display_info[&direction];

            assert_eq!(info.sweep_indices, indices);
            assert!((info.start_time_offset + GAP_FRAMES as f64 / 60.).abs() < 1e-12);
            assert!((info.sweep_duration - (GAP_FRAMES + SWEEP_FRAMES) as f64 / 60.).abs() < 1e-12);
        }

        Ok(())
    }

    #[test]
    pub fn test_phase_position_equation() -> Result<(), MappingError> {
        let display_info = parse_display_log(&default_log())?;

        // frame j of a sweep has phase 2 pi j / n, sweep frames start after the gap
        let frames_per_sweep = (GAP_FRAMES + SWEEP_FRAMES) as f64;
        let slope = frames_per_sweep / (2. * PI);

        for (block, direction) in SweepDirection::ALL.iter().enumerate() {
            let equation = display_info[direction].phase_to_position;
            let intercept = (block * SWEEP_FRAMES) as f64 - GAP_FRAMES as f64;

            assert!((equation.slope - slope).abs() < 1e-6);
            assert!((equation.intercept - intercept).abs() < 1e-6);
        }

        Ok(())
    }

    #[test]
    pub fn test_repeated_sweeps_within_iteration() -> Result<(), MappingError> {
        let display_info = parse_display_log(&build_log(&SweepDirection::ALL, 2, 1, 60., 1. / 60.))?;

        assert_eq!(display_info[&SweepDirection::BottomToUp].sweep_indices, vec![0, 1]);
        assert_eq!(display_info[&SweepDirection::UpToBottom].sweep_indices, vec![2, 3]);
        assert_eq!(display_info[&SweepDirection::RightToLeft].sweep_indices, vec![6, 7]);

        // duration is of a single sweep
        let duration = display_info[&SweepDirection::LeftToRight].sweep_duration;
        assert!((duration - (GAP_FRAMES + SWEEP_FRAMES) as f64 / 60.).abs() < 1e-12);

        Ok(())
    }

    #[test]
    pub fn test_sweep_repeats_of_unequal_length() {
        let mut log = build_log(&SweepDirection::ALL, 2, 1, 60., 1. / 60.);

        // drop one frame from the second left to right sweep
        let first_l2r = 2 * 2 * (GAP_FRAMES + SWEEP_FRAMES);
        log.presentation.display_frames.remove(first_l2r + GAP_FRAMES + SWEEP_FRAMES + 3);
        log.presentation.time_stamp.pop();

        assert!(matches!(
            parse_display_log(&log),
            Err(MappingError::ConfigurationRelatedError(ConfigurationError::UnevenSweepRepeats {
                direction: SweepDirection::LeftToRight,
                frames: 59,
                iteration: 2,
            }))
        ));
    }

    #[test]
    pub fn test_pre_gap_duration_takes_precedence() -> Result<(), MappingError> {
        let mut log = default_log();
        log.stimulation.pre_gap_dur = Some(0.25);

        let display_info = parse_display_log(&log)?;

        assert_eq!(display_info[&SweepDirection::LeftToRight].start_time_offset, -0.25);

        Ok(())
    }

    #[test]
    pub fn test_parse_json_log() -> Result<(), MappingError> {
        let content = r#"{
            "stimulation": {
                "stimName": "KSstimAllDir",
                "preGapDur": 0.02,
                "sweepTable": [-10.0, 10.0, 20.0, 0.0, 5.0, 15.0, 25.0, 35.0]
            },
            "presentation": {
                "displayOrder": 1,
                "displayIteration": 1,
                "timeStamp": [0.0, 0.02, 0.04, 0.06, 0.08, 0.1, 0.12, 0.14, 0.16, 0.18, 0.2, 0.22],
                "displayFrames": [
                    {"isDisplay": 0, "sweepIndex": null, "direction": "B2U"},
                    {"isDisplay": 1, "sweepIndex": 0, "squarePolarity": 1.0, "direction": "B2U"},
                    {"isDisplay": 1, "sweepIndex": 1, "squarePolarity": -1.0, "direction": "B2U"},
                    {"isDisplay": 0, "sweepIndex": null, "direction": "U2B"},
                    {"isDisplay": 1, "sweepIndex": 1, "direction": "U2B"},
                    {"isDisplay": 1, "sweepIndex": 0, "direction": "U2B"},
                    {"isDisplay": 0, "direction": "L2R"},
                    {"isDisplay": 1, "sweepIndex": 4, "direction": "L2R"},
                    {"isDisplay": 1, "sweepIndex": 6, "direction": "L2R"},
                    {"isDisplay": 0, "direction": "R2L"},
                    {"isDisplay": 1, "sweepIndex": 7, "direction": "R2L"},
                    {"isDisplay": 1, "sweepIndex": 5, "direction": "R2L"}
                ]
            },
            "monitor": {
                "refreshRate": 50.0
            }
        }"#;

        let log = DisplayLog::from_json_str(content)?;
        assert_eq!(log.stimulation.iteration, 1);
        assert_eq!(log.presentation.display_frames[0].sweep_index, None);

        let display_info = parse_display_log(&log)?;

        let b2u = &display_info[&SweepDirection::BottomToUp];
        assert_eq!(b2u.sweep_indices, vec![0]);
        assert_eq!(b2u.start_time_offset, -0.02);
        assert!((b2u.sweep_duration - 0.06).abs() < 1e-12);

        // phases 2 pi / 3 and 4 pi / 3 map to -10 and 10 degrees
        let equation = b2u.phase_to_position;
        assert!((equation.evaluate(2. * PI / 3.) + 10.).abs() < 1e-9);
        assert!((equation.evaluate(4. * PI / 3.) - 10.).abs() < 1e-9);

        let u2b = display_info[&SweepDirection::UpToBottom].phase_to_position;
        assert!(u2b.slope < 0.);

        let r2l = display_info[&SweepDirection::RightToLeft].phase_to_position;
        assert!((r2l.evaluate(2. * PI / 3.) - 35.).abs() < 1e-9);

        Ok(())
    }

    #[test]
    pub fn test_malformed_json() {
        let result = DisplayLog::from_json_str("{\"stimulation\": {}}");

        assert!(matches!(
            result,
            Err(MappingError::ConfigurationRelatedError(ConfigurationError::MalformedLog(_)))
        ));
    }

    #[test]
    pub fn test_reversed_display_order() {
        let mut log = default_log();
        log.presentation.display_order = -1;

        assert!(matches!(
            parse_display_log(&log),
            Err(MappingError::ConfigurationRelatedError(ConfigurationError::ReversedDisplayOrder))
        ));
    }

    #[test]
    pub fn test_unknown_stimulus() {
        let mut log = default_log();
        log.stimulation.stim_name = String::from("UniformContrast");

        assert!(matches!(
            parse_display_log(&log),
            Err(MappingError::ConfigurationRelatedError(ConfigurationError::UnknownStimulus(_)))
        ));
    }

    #[test]
    pub fn test_dropped_frames() {
        // frames were shown every 1.5 refresh intervals on average
        let log = build_log(&SweepDirection::ALL, 1, 1, 60., 1.5 / 60.);

        assert!(matches!(
            parse_display_log(&log),
            Err(MappingError::TimingRelatedError(TimingError::DisplayIntervalTooLong { .. }))
        ));
    }

    #[test]
    pub fn test_frames_shown_too_fast() {
        let log = build_log(&SweepDirection::ALL, 1, 1, 60., 0.9 / 60.);

        assert!(matches!(
            parse_display_log(&log),
            Err(MappingError::TimingRelatedError(TimingError::DisplayIntervalTooShort { .. }))
        ));
    }

    #[test]
    pub fn test_missing_direction() {
        let directions = [
            SweepDirection::BottomToUp,
            SweepDirection::UpToBottom,
            SweepDirection::LeftToRight,
        ];
        let log = build_log(&directions, 1, 1, 60., 1. / 60.);

        assert!(matches!(
            parse_display_log(&log),
            Err(MappingError::ConfigurationRelatedError(
                ConfigurationError::MissingDirection(SweepDirection::RightToLeft)
            ))
        ));
    }

    #[test]
    pub fn test_frame_timestamp_mismatch() {
        let mut log = default_log();
        log.presentation.time_stamp.pop();

        assert!(matches!(
            parse_display_log(&log),
            Err(MappingError::ConfigurationRelatedError(ConfigurationError::FrameTimestampMismatch { .. }))
        ));
    }

    #[test]
    pub fn test_missing_pre_gap() {
        let mut log = default_log();
        log.stimulation.pre_gap_frame_num = None;

        assert!(matches!(
            parse_display_log(&log),
            Err(MappingError::ConfigurationRelatedError(ConfigurationError::MissingPreGap))
        ));
    }

    #[test]
    pub fn test_sweep_index_outside_table() {
        let mut log = default_log();
        log.stimulation.sweep_table.truncate(10);

        assert!(matches!(
            parse_display_log(&log),
            Err(MappingError::ConfigurationRelatedError(ConfigurationError::SweepIndexOutOfRange { .. }))
        ));
    }
}
