//! Shared doubles for lifecycle and dispatcher tests.
//!
//! [`FakeEnvironment`] simulates a single daemon process and records every
//! interaction in order; [`MockEnvironment`] is the `mockall` double for tests
//! that assert exact call expectations.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use isagent_config::{Config, SettlePolicy};
use mockall::mock;
use nix::errno::Errno;
use tempfile::TempDir;

use crate::lifecycle::{
    DaemonLaunch, LifecycleController, LifecycleError, PidStore, ProcessEnvironment, ProcessId,
    TerminationSignal,
};

mock! {
    pub Environment {}
    impl ProcessEnvironment for Environment {
        fn process_exists(&self, pid: ProcessId) -> Result<bool, LifecycleError>;
        fn send_signal(
            &self,
            pid: ProcessId,
            signal: TerminationSignal,
        ) -> Result<(), LifecycleError>;
        fn launch(&self, launch: &DaemonLaunch) -> Result<(), LifecycleError>;
        fn artifact_exists(&self, path: &Utf8Path) -> bool;
        fn pause(&self, duration: Duration);
    }
}

/// Interaction recorded by [`FakeEnvironment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Probe(u32),
    Signal(u32, TerminationSignal),
    Launch(Utf8PathBuf, String),
    Stat(Utf8PathBuf),
    Pause(Duration),
}

/// What the simulated daemon does when launched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum LaunchBehaviour {
    /// Writes its pid file and stays up.
    #[default]
    Starts,
    /// Writes its pid file and exits straight away.
    Crashes,
    /// The executable cannot be spawned at all.
    FailsToSpawn,
}

/// Scripted single-process host.
#[derive(Debug)]
pub(crate) struct FakeEnvironment {
    pid_path: Option<Utf8PathBuf>,
    running: Cell<Option<u32>>,
    next_pid: Cell<u32>,
    ignored: RefCell<HashSet<TerminationSignal>>,
    launch_behaviour: Cell<LaunchBehaviour>,
    probe_fails: Cell<bool>,
    exits_before_signal: Cell<bool>,
    installed: Cell<bool>,
    events: RefCell<Vec<Event>>,
}

impl Default for FakeEnvironment {
    fn default() -> Self {
        Self {
            pid_path: None,
            running: Cell::new(None),
            next_pid: Cell::new(5000),
            ignored: RefCell::new(HashSet::new()),
            launch_behaviour: Cell::new(LaunchBehaviour::default()),
            probe_fails: Cell::new(false),
            exits_before_signal: Cell::new(false),
            installed: Cell::new(true),
            events: RefCell::new(Vec::new()),
        }
    }
}

impl FakeEnvironment {
    /// A host whose daemon writes its pid to `pid_path` when launched.
    pub(crate) fn with_pid_file(pid_path: &Utf8Path) -> Self {
        Self {
            pid_path: Some(pid_path.to_path_buf()),
            ..Self::default()
        }
    }

    /// Marks `pid` as a live process.
    pub(crate) fn set_running(&self, pid: u32) {
        self.running.set(Some(pid));
    }

    /// Makes the simulated daemon survive `signal`.
    pub(crate) fn ignore(&self, signal: TerminationSignal) {
        self.ignored.borrow_mut().insert(signal);
    }

    pub(crate) fn set_launch_behaviour(&self, behaviour: LaunchBehaviour) {
        self.launch_behaviour.set(behaviour);
    }

    /// Makes every existence query fail with an OS error.
    pub(crate) fn fail_probes(&self) {
        self.probe_fails.set(true);
    }

    /// Makes the daemon exit on its own just before the first signal lands.
    pub(crate) fn exit_before_signal(&self) {
        self.exits_before_signal.set(true);
    }

    pub(crate) fn set_installed(&self, installed: bool) {
        self.installed.set(installed);
    }

    pub(crate) fn running_pid(&self) -> Option<u32> {
        self.running.get()
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub(crate) fn signals(&self) -> Vec<TerminationSignal> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Signal(_, signal) => Some(*signal),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn launches(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| matches!(event, Event::Launch(..)))
            .count()
    }

    /// True when the pid file, probe, and OS were never consulted.
    pub(crate) fn untouched(&self) -> bool {
        self.events.borrow().is_empty()
    }

    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    fn allocate_pid(&self) -> u32 {
        let pid = self.next_pid.get();
        self.next_pid.set(pid + 1);
        pid
    }

    fn write_pid_file(&self, pid: u32) -> io::Result<()> {
        match &self.pid_path {
            Some(path) => fs::write(path, format!("{pid}\n")),
            None => Ok(()),
        }
    }
}

impl ProcessEnvironment for FakeEnvironment {
    fn process_exists(&self, pid: ProcessId) -> Result<bool, LifecycleError> {
        self.record(Event::Probe(pid.get()));
        if self.probe_fails.get() {
            return Err(LifecycleError::Probe {
                pid,
                source: Errno::EIO,
            });
        }
        Ok(self.running.get() == Some(pid.get()))
    }

    fn send_signal(
        &self,
        pid: ProcessId,
        signal: TerminationSignal,
    ) -> Result<(), LifecycleError> {
        self.record(Event::Signal(pid.get(), signal));
        if self.exits_before_signal.replace(false) {
            self.running.set(None);
        }
        if self.running.get() != Some(pid.get()) {
            return Err(LifecycleError::Signal {
                pid,
                signal,
                source: Errno::ESRCH,
            });
        }
        if !self.ignored.borrow().contains(&signal) {
            self.running.set(None);
        }
        Ok(())
    }

    fn launch(&self, launch: &DaemonLaunch) -> Result<(), LifecycleError> {
        self.record(Event::Launch(
            launch.binary().to_path_buf(),
            launch.flag().to_owned(),
        ));
        let spawn_error = |source| LifecycleError::Launch {
            binary: launch.binary().to_path_buf(),
            source,
        };
        match self.launch_behaviour.get() {
            LaunchBehaviour::FailsToSpawn => Err(spawn_error(io::Error::from(
                io::ErrorKind::NotFound,
            ))),
            LaunchBehaviour::Starts => {
                let pid = self.allocate_pid();
                self.write_pid_file(pid).map_err(spawn_error)?;
                self.running.set(Some(pid));
                Ok(())
            }
            LaunchBehaviour::Crashes => {
                let pid = self.allocate_pid();
                self.write_pid_file(pid).map_err(spawn_error)
            }
        }
    }

    fn artifact_exists(&self, path: &Utf8Path) -> bool {
        self.record(Event::Stat(path.to_path_buf()));
        self.installed.get()
    }

    fn pause(&self, duration: Duration) {
        self.record(Event::Pause(duration));
    }
}

/// Temporary pid file location plus the configuration pointing at it.
pub(crate) struct PidFixture {
    _dir: TempDir,
    pid_path: Utf8PathBuf,
}

impl PidFixture {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let pid_path =
            Utf8PathBuf::from_path_buf(dir.path().join("is.pid")).expect("utf8 temp path");
        Self {
            _dir: dir,
            pid_path,
        }
    }

    pub(crate) fn pid_path(&self) -> &Utf8Path {
        self.pid_path.as_path()
    }

    pub(crate) fn write_pid(&self, content: &str) {
        fs::write(&self.pid_path, content).expect("write pid file");
    }

    pub(crate) fn config(&self) -> Config {
        Config {
            pid_path: self.pid_path.clone(),
            ..Config::default()
        }
    }

    pub(crate) fn controller<'a, E>(&self, environment: &'a E) -> LifecycleController<'a, E>
    where
        E: ProcessEnvironment + ?Sized,
    {
        LifecycleController::new(
            environment,
            PidStore::new(self.pid_path.clone()),
            DaemonLaunch::new("/pf/bin/linux-x86_64/is", "-d"),
            default_policy(),
        )
    }
}

pub(crate) fn default_policy() -> SettlePolicy {
    Config::default().settle_policy()
}
