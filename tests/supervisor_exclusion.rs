// tests/supervisor_exclusion.rs

use proptest::prelude::*;
use resticon::request::{CommandName, CommandRequest};
use resticon::supervisor::{HaltOutcome, SubmitOutcome, Supervisor};
use resticon_test_utils::builders::ConfigBuilder;
use resticon_test_utils::eventually;
use resticon_test_utils::script_launcher::ScriptLauncher;

#[derive(Debug, Clone)]
enum Op {
    Submit(CommandName),
    Halt,
    Poll,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => proptest::sample::select(CommandName::WORKER_COMMANDS.to_vec()).prop_map(Op::Submit),
        1 => Just(Op::Halt),
        1 => Just(Op::Poll),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    // Workers never finish on their own here, so the only way to free the
    // slot is `halt`; the supervisor must match a one-bit model exactly.
    // Each worker also has a child, which must die with it.
    #[test]
    fn at_most_one_worker_is_ever_live(ops in proptest::collection::vec(op_strategy(), 1..12)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let launcher = ScriptLauncher::with_child();
            let mut sup = Supervisor::new(launcher.clone());
            let cfg = ConfigBuilder::new().build();
            let mut live = false;
            let mut started = 0usize;

            for op in &ops {
                match op {
                    Op::Submit(name) => {
                        let outcome = sup.submit(&CommandRequest::new(*name, vec![]), &cfg).await.unwrap();
                        if live {
                            prop_assert_eq!(outcome, SubmitOutcome::Rejected);
                        } else {
                            prop_assert!(matches!(outcome, SubmitOutcome::Started { .. }), "expected Started, got {:?}", outcome);
                            live = true;
                            started += 1;
                        }
                    }
                    Op::Halt => {
                        let outcome = sup.halt().await.unwrap();
                        prop_assert_eq!(matches!(outcome, HaltOutcome::Stopped { .. }), live);
                        live = false;
                        prop_assert!(!sup.is_busy());
                        prop_assert!(
                            eventually(|| launcher.stray_processes().is_empty()).await,
                            "halted worker left processes: {:?}",
                            launcher.stray_processes()
                        );
                    }
                    Op::Poll => prop_assert_eq!(sup.is_busy(), live),
                }

                let live_pids = launcher.live_pids();
                prop_assert!(live_pids.len() <= 1, "two workers alive: {:?}", live_pids);
                prop_assert_eq!(live_pids.len(), usize::from(live));
            }

            prop_assert_eq!(launcher.launched().len(), started);
            sup.halt().await.unwrap();
            Ok(())
        })?;
    }
}
