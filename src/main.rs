//! evreplay - Replay a recorded input event log through uinput

use std::process::ExitCode;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use evreplay::config::Config;
use evreplay::device::{ControlChannel, DeviceEmulator, DeviceResult};
use evreplay::replay::{Pacer, ReplayEngine, ReplayError, ReplayReport};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let loaded = Config::load_default();
    let level = loaded
        .as_ref()
        .map(|config| config.general.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Initialize logging; diagnostics never go to stdout
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", diagnostic(&e));
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_os = "linux")]
async fn run(config: &Config) -> anyhow::Result<ReplayReport> {
    use evreplay::device::UinputChannel;
    use evreplay::replay::ThreadPacer;

    let channel = UinputChannel::open(&config.device.path)?;
    replay_into(channel, ThreadPacer, config).await
}

#[cfg(not(target_os = "linux"))]
async fn run(_config: &Config) -> anyhow::Result<ReplayReport> {
    anyhow::bail!("Input playback requires the Linux uinput subsystem")
}

/// Build the virtual device on `channel`, replay the log into it, then tear it down
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
async fn replay_into<C, P>(channel: C, pacer: P, config: &Config) -> anyhow::Result<ReplayReport>
where
    C: ControlChannel,
    P: Pacer,
{
    let mut emulator = DeviceEmulator::new(channel, config.device.descriptor());

    let declared = emulator.declare_capabilities();
    if declared.failed > 0 {
        tracing::warn!(
            "{} of {} capability declarations failed, continuing with a partial device",
            declared.failed,
            declared.declared + declared.failed
        );
    }
    emulator.create_device()?;

    let mut engine =
        ReplayEngine::new(pacer).with_first_event_delay(config.playback.first_event_delay());
    let replay = engine
        .play_file(&config.playback.log_path, &mut emulator)
        .await;
    let teardown = emulator.destroy_device();

    finish(replay, teardown)
}

/// One-line message for a fatal error.
///
/// Each error's own message already carries the OS error text, so the
/// source chain is not appended again.
fn diagnostic(err: &anyhow::Error) -> String {
    err.to_string()
}

/// Combine the replay and teardown results; both must succeed
fn finish(
    replay: Result<ReplayReport, ReplayError>,
    teardown: DeviceResult<()>,
) -> anyhow::Result<ReplayReport> {
    match (replay, teardown) {
        (Ok(report), Ok(())) => Ok(report),
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), teardown) => {
            if let Err(t) = teardown {
                tracing::error!("{}", t);
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use evreplay::device::{Capability, DeviceError};
    use evreplay::event::{EventTime, InputEvent};
    use std::cell::RefCell;
    use std::io::{self, Write};
    use std::rc::Rc;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Declare,
        Descriptor,
        Create,
        Event(Vec<u8>),
        Destroy,
    }

    #[derive(Default)]
    struct RecordingChannel {
        calls: Rc<RefCell<Vec<Call>>>,
    }

    impl ControlChannel for RecordingChannel {
        fn declare(&mut self, _capability: Capability) -> io::Result<()> {
            self.calls.borrow_mut().push(Call::Declare);
            Ok(())
        }

        fn write_descriptor(&mut self, _descriptor: &[u8]) -> io::Result<()> {
            self.calls.borrow_mut().push(Call::Descriptor);
            Ok(())
        }

        fn create(&mut self) -> io::Result<()> {
            self.calls.borrow_mut().push(Call::Create);
            Ok(())
        }

        fn write_event(&mut self, record: &[u8]) -> io::Result<usize> {
            self.calls.borrow_mut().push(Call::Event(record.to_vec()));
            Ok(record.len())
        }

        fn destroy(&mut self) -> io::Result<()> {
            self.calls.borrow_mut().push(Call::Destroy);
            Ok(())
        }
    }

    struct NoPause;

    #[async_trait]
    impl Pacer for NoPause {
        async fn pause(&mut self, _delay: Duration) {}
    }

    fn position(calls: &[Call], wanted: &Call) -> usize {
        calls.iter().position(|c| c == wanted).unwrap()
    }

    #[test]
    fn test_replay_then_destroy() {
        let events = vec![
            InputEvent::new(EventTime::new(1_700_000_000, 0), 1, 30, 1),
            InputEvent::new(EventTime::new(1_700_000_000, 50_000), 1, 30, 0),
            InputEvent::new(EventTime::new(1_700_000_000, 120_000), 1, 30, 1),
        ];
        let mut log = tempfile::NamedTempFile::new().unwrap();
        for event in &events {
            log.write_all(&event.to_bytes()).unwrap();
        }

        let mut config = Config::default();
        config.playback.log_path = log.path().to_path_buf();
        let channel = RecordingChannel::default();
        let calls = channel.calls.clone();

        let report = tokio_test::block_on(replay_into(channel, NoPause, &config)).unwrap();
        assert_eq!(report.injected, 3);

        let calls = calls.borrow();
        let create = position(&calls, &Call::Create);
        let injected: Vec<Call> = events
            .iter()
            .map(|e| Call::Event(e.to_bytes().to_vec()))
            .collect();
        assert_eq!(&calls[create + 1..create + 4], &injected[..]);
        assert_eq!(calls.last(), Some(&Call::Destroy));
        assert_eq!(calls.iter().filter(|c| **c == Call::Destroy).count(), 1);
    }

    #[test]
    fn test_missing_log_still_destroys_device() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.playback.log_path = dir.path().join("record-input.log");
        let channel = RecordingChannel::default();
        let calls = channel.calls.clone();

        let err = tokio_test::block_on(replay_into(channel, NoPause, &config)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReplayError>(),
            Some(ReplayError::LogUnavailable { .. })
        ));

        let calls = calls.borrow();
        assert!(position(&calls, &Call::Create) < position(&calls, &Call::Destroy));
        assert!(!calls.iter().any(|c| matches!(c, Call::Event(_))));
    }

    #[test]
    fn test_diagnostic_names_os_error_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record-input.log");
        let err = finish(
            Err(ReplayError::LogUnavailable {
                path: path.clone(),
                // ENOENT
                source: io::Error::from_raw_os_error(2),
            }),
            Ok(()),
        )
        .unwrap_err();

        let message = diagnostic(&err);
        assert!(message.contains(&path.display().to_string()));
        assert_eq!(message.matches("os error").count(), 1);
    }

    #[test]
    fn test_finish_requires_clean_teardown() {
        let report = ReplayReport {
            injected: 3,
            ..Default::default()
        };
        assert_eq!(finish(Ok(report.clone()), Ok(())).unwrap(), report);

        let err = finish(
            Ok(report),
            Err(DeviceError::DestroyFailed(io::Error::from(io::ErrorKind::Other))),
        )
        .unwrap_err();
        assert!(err.to_string().contains("destruction"));
    }

    #[test]
    fn test_finish_reports_replay_error_first() {
        let err = finish(
            Err(ReplayError::LogRead(io::Error::from(io::ErrorKind::Other))),
            Err(DeviceError::DestroyFailed(io::Error::from(io::ErrorKind::Other))),
        )
        .unwrap_err();
        assert!(err.downcast_ref::<ReplayError>().is_some());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_unavailable_control_interface_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.device.path = dir.path().join("uinput");
        config.playback.log_path = dir.path().join("record-input.log");

        let err = tokio_test::block_on(run(&config)).unwrap_err();

        match err.downcast_ref::<DeviceError>() {
            Some(DeviceError::Unavailable { path, .. }) => assert_eq!(*path, config.device.path),
            other => panic!("unexpected error: {:?}", other),
        }
        let message = diagnostic(&err);
        assert!(message.contains("control interface"));
        assert_eq!(message.matches("os error").count(), 1);
    }
}
