//! Loopback server so the dashboard can be driven without a real backend.
//!
//! Outbound calls travel to a worker thread over `mpsc`; the simulated
//! server answers with the same pushes a real one would send.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use sd_app::{CallKind, ChannelCall, RemoteChannel, ServerEvent};
use sd_core::{PanelId, RoutineId, Size, TreePath};
use sd_layout::TableRow;
use sd_session::{AnalysisOptions, ShotSelection, StatusChange};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// How long a simulated routine runs before it finishes.
const RUN_LENGTH: Duration = Duration::from_secs(3);
/// Simulated cost of one analysis pass.
const ANALYSIS_COST: Duration = Duration::from_millis(50);
const POLL: Duration = Duration::from_millis(10);
const PLOT_SIZE: Size = Size::new(640.0, 480.0);

/// Channel handed to the controller.
pub struct WorkerChannel {
    tx: Sender<ChannelCall>,
}

impl WorkerChannel {
    fn push(&mut self, kind: CallKind, action: &str, args: Vec<Value>) {
        let call = ChannelCall {
            kind,
            action: action.to_string(),
            args,
        };
        if self.tx.send(call).is_err() {
            tracing::warn!(action, "loopback server is gone; call dropped");
        }
    }
}

impl RemoteChannel for WorkerChannel {
    fn request(&mut self, action: &str, args: Vec<Value>) {
        self.push(CallKind::Request, action, args);
    }

    fn subscribe(&mut self, action: &str, args: Vec<Value>) {
        self.push(CallKind::Subscribe, action, args);
    }
}

pub struct LoopbackServer {
    pub events_rx: Receiver<ServerEvent>,
    _handle: JoinHandle<()>,
}

impl LoopbackServer {
    /// Spawn the worker. It exits once the returned channel is dropped.
    pub fn start(ctx: egui::Context) -> (WorkerChannel, Self) {
        let (call_tx, call_rx) = channel::<ChannelCall>();
        let (event_tx, event_rx) = channel();

        let handle = thread::spawn(move || {
            let mut sim = Simulator::default();
            loop {
                let mut events = match call_rx.recv_timeout(POLL) {
                    Ok(call) => sim.handle(&call, Instant::now()),
                    Err(RecvTimeoutError::Timeout) => Vec::new(),
                    Err(RecvTimeoutError::Disconnected) => break,
                };
                events.extend(sim.advance(Instant::now()));
                if events.is_empty() {
                    continue;
                }
                for event in events {
                    if event_tx.send(event).is_err() {
                        return;
                    }
                }
                ctx.request_repaint();
            }
            tracing::debug!("loopback server stopped");
        });

        (
            WorkerChannel { tx: call_tx },
            Self {
                events_rx: event_rx,
                _handle: handle,
            },
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SimState {
    Idle,
    Running { since: Instant },
    Paused,
}

#[derive(Debug, Clone)]
struct SimRoutine {
    id: RoutineId,
    name: String,
    state: SimState,
    remaining: Duration,
}

#[derive(Debug, Clone)]
struct AnalysisLoop {
    period: Duration,
    /// `None` while paused.
    next_at: Option<Instant>,
    frame: u32,
}

/// Server-side state of the loopback backend.
#[derive(Debug, Default)]
pub struct Simulator {
    files: HashMap<String, TreePath>,
    routines: Vec<SimRoutine>,
    options: HashMap<String, AnalysisOptions>,
    analysis: Option<AnalysisLoop>,
}

fn arg<T: DeserializeOwned>(args: &[Value], index: usize) -> serde_json::Result<T> {
    serde_json::from_value(args.get(index).cloned().unwrap_or(Value::Null))
}

fn plot_id(routine: &str) -> PanelId {
    PanelId::for_plot(routine, "signal", 0)
}

impl Simulator {
    /// Answer one outbound call.
    pub fn handle(&mut self, call: &ChannelCall, now: Instant) -> Vec<ServerEvent> {
        tracing::debug!(action = %call.action, "loopback call");
        match self.dispatch(call, now) {
            Ok(events) => events,
            Err(err) => vec![ServerEvent::StatusMessage(format!(
                "Malformed '{}' request: {err}",
                call.action
            ))],
        }
    }

    fn dispatch(&mut self, call: &ChannelCall, now: Instant) -> serde_json::Result<Vec<ServerEvent>> {
        let args = call.args.as_slice();
        let events = match call.action.as_str() {
            "add_folder" => {
                let parent: TreePath = arg(args, 0)?;
                vec![ServerEvent::FolderAdded {
                    parent,
                    name: arg(args, 1)?,
                }]
            }
            "remove_folder" => {
                let path: TreePath = arg(args, 0)?;
                self.files.retain(|_, p| !p.starts_with(&path));
                vec![ServerEvent::NodeRemoved { path }]
            }
            "remove_file" => {
                let name: String = arg(args, 0)?;
                match self.files.remove(&name) {
                    Some(path) => vec![ServerEvent::NodeRemoved { path }],
                    None => vec![ServerEvent::StatusMessage(format!("'{name}' not found"))],
                }
            }
            "add_routine" => self.add_routine(arg(args, 0)?),
            "run_routine" => {
                let id: RoutineId = arg(args, 0)?;
                self.set_state(&[id], now, |_| Some(SimState::Running { since: now }))
            }
            "pause_routine" => {
                let ids: Vec<RoutineId> = arg(args, 0)?;
                self.set_state(&ids, now, |s| {
                    matches!(s, SimState::Running { .. }).then_some(SimState::Paused)
                })
            }
            "stop_routine" => {
                let ids: Vec<RoutineId> = arg(args, 0)?;
                self.set_state(&ids, now, |s| (s != SimState::Idle).then_some(SimState::Idle))
            }
            "remove_routine" => {
                let ids: Vec<RoutineId> = arg(args, 0)?;
                self.routines.retain(|r| !ids.contains(&r.id));
                vec![ServerEvent::RoutinesRemoved { ids }]
            }
            "analyse" => {
                let paused: bool = arg(args, 0)?;
                let period: f64 = arg(args, 1)?;
                self.start_analysis(paused, period, now)
            }
            "pause_analysis" => match self.analysis.as_mut() {
                Some(ana) => {
                    ana.next_at = None;
                    vec![ServerEvent::AnalysisPaused]
                }
                None => Vec::new(),
            },
            "stop_analysis" => {
                self.analysis = None;
                vec![ServerEvent::AnalysisStopped]
            }
            "select_data_dir" => {
                let path: String = arg(args, 0)?;
                let apply: bool = arg(args, 1)?;
                let routine: String = arg(args, 2)?;
                let target = if apply {
                    format!("'{routine}'")
                } else {
                    "all routines".to_string()
                };
                let message = if path == "reset" {
                    format!("Data directory reset for {target}")
                } else {
                    format!("Data directory of {target} set to '{path}'")
                };
                vec![ServerEvent::StatusMessage(message)]
            }
            "set_shots_dir" => {
                let routine: String = arg(args, 0)?;
                let dir: String = arg(args, 1)?;
                vec![ServerEvent::StatusMessage(format!(
                    "Shots directory of '{routine}' set to '{dir}'"
                ))]
            }
            "set_analysis_type" => {
                let routine: String = arg(args, 0)?;
                let select_by: ShotSelection = arg(args, 1)?;
                self.options.entry(routine).or_default().select_by = select_by;
                Vec::new()
            }
            "set_analysis_options" => {
                let routine: String = arg(args, 0)?;
                let options: AnalysisOptions = arg(args, 1)?;
                let message = format!("Analysis options of '{routine}' updated");
                self.options.insert(routine, options);
                vec![ServerEvent::StatusMessage(message)]
            }
            "display_routine_info" | "refresh_analysis" => {
                let routine: String = arg(args, 0)?;
                let options = self.options.get(&routine).cloned().unwrap_or_default();
                vec![ServerEvent::RoutineInfo { routine, options }]
            }
            "set_log" => vec![ServerEvent::LogPathChanged(arg(args, 0)?)],
            other => vec![ServerEvent::StatusMessage(format!("Unknown action '{other}'"))],
        };
        Ok(events)
    }

    fn add_routine(&mut self, filename: String) -> Vec<ServerEvent> {
        let id = RoutineId::from_filename(&filename);
        let path = TreePath::root().join(&filename);
        self.routines.push(SimRoutine {
            id: id.clone(),
            name: filename.clone(),
            state: SimState::Idle,
            remaining: RUN_LENGTH,
        });
        let mut events = vec![ServerEvent::RoutineUploaded {
            id,
            name: filename.clone(),
        }];
        if let Ok(path) = path {
            self.files.insert(filename.clone(), path);
            events.push(ServerEvent::FileAdded {
                parent: TreePath::root(),
                name: filename,
                routine: true,
            });
        }
        events
    }

    /// Move each listed routine to the state `next` picks for it.
    fn set_state(
        &mut self,
        ids: &[RoutineId],
        now: Instant,
        next: impl Fn(SimState) -> Option<SimState>,
    ) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        for routine in self.routines.iter_mut().filter(|r| ids.contains(&r.id)) {
            let Some(state) = next(routine.state) else {
                continue;
            };
            if let SimState::Running { since } = routine.state {
                routine.remaining = routine
                    .remaining
                    .saturating_sub(now.saturating_duration_since(since));
            }
            let status = match state {
                SimState::Running { .. } => StatusChange::Running,
                SimState::Paused => StatusChange::Paused,
                SimState::Idle => {
                    routine.remaining = RUN_LENGTH;
                    StatusChange::Idle
                }
            };
            routine.state = state;
            events.push(ServerEvent::RoutineStatusChanged {
                id: routine.id.clone(),
                status,
            });
        }
        events
    }

    fn start_analysis(&mut self, resume: bool, period: f64, now: Instant) -> Vec<ServerEvent> {
        let period = Duration::from_secs_f64(period.clamp(0.001, 3600.0));
        let mut events = vec![ServerEvent::AnalysisStarted];
        if period < ANALYSIS_COST {
            events.push(ServerEvent::PeriodWarning);
        }

        let frame = match (&self.analysis, resume) {
            (Some(ana), true) => ana.frame,
            _ => {
                for routine in &self.routines {
                    let panel = plot_id(&routine.name);
                    events.push(ServerEvent::RoutineGroupCreated {
                        routine: routine.name.clone(),
                    });
                    events.push(ServerEvent::PlotCreated {
                        routine: routine.name.clone(),
                        panel: panel.clone(),
                        url: format!("sim://{panel}/0"),
                        size: PLOT_SIZE,
                    });
                    events.push(table_event(&routine.name, &panel, 0));
                }
                0
            }
        };
        self.analysis = Some(AnalysisLoop {
            period,
            next_at: Some(now + period),
            frame,
        });
        events
    }

    /// Emit whatever became due by `now`.
    pub fn advance(&mut self, now: Instant) -> Vec<ServerEvent> {
        let mut events = Vec::new();

        for routine in &mut self.routines {
            if let SimState::Running { since } = routine.state {
                if now.saturating_duration_since(since) >= routine.remaining {
                    routine.state = SimState::Idle;
                    routine.remaining = RUN_LENGTH;
                    let status = if routine.name.contains("fail") {
                        StatusChange::Error
                    } else {
                        StatusChange::Idle
                    };
                    events.push(ServerEvent::RoutineStatusChanged {
                        id: routine.id.clone(),
                        status,
                    });
                }
            }
        }

        if let Some(ana) = self.analysis.as_mut() {
            if let Some(due) = ana.next_at.filter(|due| *due <= now) {
                ana.frame += 1;
                ana.next_at = Some(due + ana.period);
                for routine in &self.routines {
                    let panel = plot_id(&routine.name);
                    let height = PLOT_SIZE.height + (ana.frame % 3) as f32 * 40.0;
                    events.push(ServerEvent::PanelImageReady {
                        panel: panel.clone(),
                        url: format!("sim://{panel}/{}", ana.frame),
                        size: Size::new(PLOT_SIZE.width, height),
                    });
                    events.push(table_event(&routine.name, &panel, ana.frame));
                }
            }
        }
        events
    }
}

fn table_event(routine: &str, plot: &PanelId, frame: u32) -> ServerEvent {
    ServerEvent::TableReady {
        routine: routine.to_string(),
        panel: plot.table(),
        caption: "Fit results".to_string(),
        rows: vec![
            TableRow {
                name: "shot".to_string(),
                value: frame.to_string(),
            },
            TableRow {
                name: "amplitude".to_string(),
                value: format!("{:.3}", 1.0 + 0.1 * f64::from(frame % 7)),
            },
        ],
        size: None,
    }
}
