// ABOUTME: builds the daemon's line-oriented, timestamped log dispatcher.
// ABOUTME: the dispatcher is handed to the poll task instead of being installed globally.

use tracing::Dispatch;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn dispatch(level: &str) -> Dispatch {
    dispatch_with_writer(level, std::io::stdout)
}

pub fn dispatch_with_writer<W>(level: &str, writer: W) -> Dispatch
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false)
            .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string())),
    );
    Dispatch::new(subscriber)
}

#[cfg(test)]
pub(crate) use capture::CapturedLogs;

#[cfg(test)]
mod capture {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Debug, Clone, Default)]
    pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_carry_local_timestamp_and_level() {
        let logs = CapturedLogs::default();
        let dispatch = dispatch_with_writer("info", logs.clone());

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::info!("you are CORP\\svc");
        });

        let out = logs.contents();
        let line = out.lines().next().unwrap();
        let stamp: Vec<char> = line.chars().take(19).collect();
        assert_eq!(stamp[4], '-');
        assert_eq!(stamp[7], '-');
        assert_eq!(stamp[10], ' ');
        assert_eq!(stamp[13], ':');
        assert_eq!(stamp[16], ':');
        assert!(line.contains("INFO"));
        assert!(line.ends_with("you are CORP\\svc"));
    }

    #[test]
    fn level_filter_drops_lower_levels() {
        let logs = CapturedLogs::default();
        let dispatch = dispatch_with_writer("warn", logs.clone());

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::info!("hidden");
            tracing::warn!("shown");
        });

        let out = logs.contents();
        assert!(!out.contains("hidden"));
        assert!(out.contains("shown"));
    }

    #[test]
    fn dispatcher_is_not_installed_globally() {
        let logs = CapturedLogs::default();
        let _dispatch = dispatch_with_writer("info", logs.clone());

        tracing::info!("outside any scope");

        assert!(logs.contents().is_empty());
    }
}
