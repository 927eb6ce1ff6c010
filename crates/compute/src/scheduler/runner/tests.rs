#[cfg(test)]
mod tests {
    use vliw_core::VliwError;

    use crate::catalog::OpKind;
    use crate::program::Program;
    use crate::scheduler::runner::{BundleScheduler, Step};
    use crate::scheduler::types::SchedulerConfig;

    /// LOAD(16) -> ADD -> MOVE(32) -> MUL -> STORE(16): latencies 4, 1, 6, 2, 4.
    fn chain() -> Program {
        Program::builder()
            .load("R1", "in", 16)
            .binary(OpKind::Add, "R2", "R1", "R3", 1)
            .unary(OpKind::Move, "R4", "R2", 32)
            .binary(OpKind::Mul, "R5", "R4", "R6", 1)
            .store("R5", 16)
            .build()
            .unwrap()
    }

    fn starts(program: &Program, width: usize) -> Vec<u64> {
        BundleScheduler::new(program, SchedulerConfig::with_width(width))
            .unwrap()
            .run()
            .unwrap()
            .bundles()
            .iter()
            .map(|b| b.start_cycle)
            .collect()
    }

    #[test]
    fn dependent_chain_waits_for_latency() {
        let program = chain();
        for width in [1, 2, 8] {
            assert_eq!(starts(&program, width), vec![0, 4, 5, 11, 13]);
        }
        let schedule = BundleScheduler::new(&program, SchedulerConfig::with_width(2))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(schedule.stats().makespan, 17);
        assert_eq!(schedule.stats().stall_cycles, 0);
        assert_eq!(schedule.availability("R1"), Some(4));
        assert_eq!(schedule.availability("R5"), Some(13));
        assert_eq!(schedule.availability("R3"), Some(0));
    }

    #[test]
    fn independent_loads_fill_bundles() {
        let program = Program::builder()
            .load("R1", "a", 0)
            .load("R2", "b", 0)
            .load("R3", "c", 0)
            .load("R4", "d", 0)
            .build()
            .unwrap();
        let schedule = BundleScheduler::new(&program, SchedulerConfig::with_width(2))
            .unwrap()
            .run()
            .unwrap();

        let layout: Vec<Vec<usize>> =
            schedule.bundles().iter().map(|b| b.positions().collect()).collect();
        assert_eq!(layout, vec![vec![0, 1], vec![2, 3]]);
        assert_eq!(starts(&program, 2), vec![0, 3]);
        assert!((schedule.stats().utilization - 1.0).abs() < 1e-12);
    }

    #[test]
    fn width_one_issues_in_program_order() {
        let program = chain();
        let schedule = BundleScheduler::new(&program, SchedulerConfig::with_width(1))
            .unwrap()
            .run()
            .unwrap();
        assert!(schedule.bundles().iter().all(|b| b.len() == 1));
        assert_eq!(schedule.issue_order(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn write_after_write_is_deferred() {
        let program = Program::builder()
            .load("R1", "a", 0)
            .load("R1", "b", 0)
            .load("R2", "c", 0)
            .build()
            .unwrap();
        let schedule = BundleScheduler::new(&program, SchedulerConfig::with_width(2))
            .unwrap()
            .run()
            .unwrap();

        let layout: Vec<Vec<usize>> =
            schedule.bundles().iter().map(|b| b.positions().collect()).collect();
        assert_eq!(layout, vec![vec![0, 2], vec![1]]);
        assert_eq!(starts(&program, 2), vec![0, 3]);
    }

    #[test]
    fn write_after_read_is_deferred() {
        // Position 2 rewrites R1 while the ADD reading it is in the bundle;
        // position 3 is admitted past it into the free slot.
        let program = Program::builder()
            .load("R1", "a", 0)
            .binary(OpKind::Add, "R2", "R1", "x", 0)
            .load("R1", "b", 0)
            .binary(OpKind::Add, "R4", "R1", "y", 0)
            .build()
            .unwrap();
        let schedule = BundleScheduler::new(&program, SchedulerConfig::with_width(4))
            .unwrap()
            .run()
            .unwrap();

        let layout: Vec<(u64, Vec<usize>)> = schedule
            .bundles()
            .iter()
            .map(|b| (b.start_cycle, b.positions().collect()))
            .collect();
        assert_eq!(layout, vec![(0, vec![0]), (3, vec![1, 3]), (4, vec![2])]);
        assert_eq!(schedule.availability("R1"), Some(7));
        assert!(schedule.is_valid());
    }

    #[test]
    fn step_reports_progress() {
        let program = chain();
        let mut scheduler =
            BundleScheduler::new(&program, SchedulerConfig::with_width(2)).unwrap();
        assert_eq!(scheduler.pending().len(), 5);
        assert_eq!(scheduler.step().unwrap(), Step::Issued(0));
        assert_eq!(scheduler.cycle(), 4);
        assert_eq!(scheduler.step().unwrap(), Step::Issued(4));
        while scheduler.step().unwrap() != Step::Done {}
        assert!(scheduler.is_done());
        assert_eq!(scheduler.bundles().len(), 5);
    }

    #[test]
    fn unsupplied_input_exhausts_stall_budget() {
        let program = Program::builder().load("R1", "x", 0).store("R1", 0).build().unwrap();
        let config = SchedulerConfig { stall_budget: 4, ..SchedulerConfig::with_width(2) };
        let err = BundleScheduler::new(&program, config)
            .unwrap()
            .with_supplied(std::iter::empty::<&str>())
            .run()
            .unwrap_err();

        match err {
            VliwError::Unschedulable { cycle, stalls, pending } => {
                assert_eq!(cycle, 4);
                assert_eq!(stalls, 4);
                assert_eq!(pending, vec![0, 1]);
            }
            other => panic!("expected Unschedulable, got {other:?}"),
        }
    }

    #[test]
    fn stall_after_progress_names_the_blocked_register() {
        let program = Program::builder()
            .load("R1", "x", 0)
            .binary(OpKind::Add, "R2", "R1", "y", 0)
            .build()
            .unwrap();
        let config = SchedulerConfig { stall_budget: 4, ..SchedulerConfig::with_width(2) };
        let mut scheduler = BundleScheduler::new(&program, config)
            .unwrap()
            .with_supplied(["x"]);

        assert_eq!(scheduler.step().unwrap(), Step::Issued(0));
        for _ in 0..4 {
            assert_eq!(scheduler.step().unwrap(), Step::Stalled);
        }
        assert_eq!(scheduler.blocked_registers(), vec![program.reg("y").unwrap()]);

        let err = scheduler.step().unwrap_err();
        assert!(matches!(
            err,
            VliwError::Unschedulable { cycle: 7, stalls: 4, ref pending } if pending == &vec![1]
        ));
    }

    #[test]
    fn cyclic_dependency_is_unschedulable() {
        let program = Program::builder()
            .binary(OpKind::Add, "R1", "R2", "c", 1)
            .binary(OpKind::Add, "R2", "R1", "c", 1)
            .build()
            .unwrap();
        let err = BundleScheduler::new(&program, SchedulerConfig::default())
            .unwrap()
            .run()
            .unwrap_err();
        assert!(matches!(err, VliwError::Unschedulable { cycle: 32, stalls: 32, .. }));
    }

    #[test]
    fn self_reading_instruction_is_unschedulable() {
        let program = Program::builder()
            .binary(OpKind::Add, "R1", "R1", "c", 1)
            .build()
            .unwrap();
        let config = SchedulerConfig { stall_budget: 2, ..SchedulerConfig::default() };
        assert!(matches!(
            BundleScheduler::new(&program, config).unwrap().run(),
            Err(VliwError::Unschedulable { .. })
        ));
    }

    #[test]
    fn zero_width_is_rejected() {
        let program = chain();
        assert!(matches!(
            BundleScheduler::new(&program, SchedulerConfig::with_width(0)),
            Err(VliwError::InvalidArgument(_))
        ));
    }

    #[test]
    fn empty_program_yields_empty_schedule() {
        let program = Program::builder().build().unwrap();
        let schedule = BundleScheduler::new(&program, SchedulerConfig::default())
            .unwrap()
            .run()
            .unwrap();
        assert!(schedule.is_empty());
        assert_eq!(schedule.stats().makespan, 0);
    }

    #[test]
    fn runs_are_deterministic() {
        let program = chain();
        let a = BundleScheduler::new(&program, SchedulerConfig::with_width(3)).unwrap().run().unwrap();
        let b = BundleScheduler::new(&program, SchedulerConfig::with_width(3)).unwrap().run().unwrap();
        assert_eq!(a.bundles(), b.bundles());
        assert_eq!(a.to_string(), b.to_string());
    }
}
