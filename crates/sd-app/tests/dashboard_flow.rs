//! End-to-end flows through the dashboard controller with a recording channel.

use sd_app::{
    CallKind, DashboardConfig, DashboardController, Event, RecordingChannel, ServerEvent, UiEvent,
};
use sd_core::{PanelId, Point, RoutineId, Size};
use sd_layout::LayoutConfig;
use sd_session::{RoutineState, StatusChange};
use serde_json::json;

type Controller = DashboardController<RecordingChannel>;

fn controller(config: DashboardConfig) -> Controller {
    DashboardController::new(config, RecordingChannel::new())
}

fn uploaded(c: &mut Controller, name: &str) -> RoutineId {
    let id = RoutineId::from_filename(name);
    c.dispatch(UiEvent::UploadRoutine(Some(name.to_string())))
        .expect("upload request");
    c.dispatch(ServerEvent::RoutineUploaded {
        id: id.clone(),
        name: name.to_string(),
    })
    .expect("upload ack");
    id
}

#[test]
fn run_then_success_returns_to_idle() {
    let mut c = controller(DashboardConfig::default());
    let r = uploaded(&mut c, "fit.py");

    c.dispatch(UiEvent::RoutineClicked(r.clone())).unwrap();
    assert!(c.buttons().run);
    assert!(!c.buttons().stop);

    c.dispatch(UiEvent::RunSelected).unwrap();
    assert_eq!(c.routines().get(&r).unwrap().state, RoutineState::Running);
    assert!(!c.buttons().run);
    assert!(c.buttons().stop);

    let run = c.channel().calls.last().unwrap();
    assert_eq!(run.action, "run_routine");
    assert_eq!(run.kind, CallKind::Subscribe);

    c.dispatch(ServerEvent::RoutineStatusChanged {
        id: r.clone(),
        status: StatusChange::Idle,
    })
    .unwrap();
    let entry = c.routines().get(&r).unwrap();
    assert_eq!(entry.state.class(), "idle");
    assert!(c.buttons().run);
    assert!(!c.buttons().stop);
}

#[test]
fn failed_run_shows_error_until_next_run() {
    let mut c = controller(DashboardConfig::default());
    let r = uploaded(&mut c, "fit.py");
    c.dispatch(UiEvent::RoutineClicked(r.clone())).unwrap();
    c.dispatch(UiEvent::RunSelected).unwrap();
    c.dispatch(ServerEvent::RoutineStatusChanged {
        id: r.clone(),
        status: StatusChange::Error,
    })
    .unwrap();
    assert_eq!(c.view().routines[0].class, "error");

    c.dispatch(UiEvent::RunSelected).unwrap();
    assert_eq!(c.view().routines[0].class, "running");
}

#[test]
fn row_height_follows_visible_mean() {
    let config = DashboardConfig {
        layout: LayoutConfig {
            viewport: Size::new(2000.0, 2000.0),
            initial_factor: 1.0,
            ..LayoutConfig::default()
        },
        panels_start_visible: true,
        ..DashboardConfig::default()
    };
    let mut c = controller(config);
    let p1 = PanelId::for_plot("fit.py", "a", 0);
    let p2 = PanelId::for_plot("fit.py", "b", 0);
    for (id, height) in [(&p1, 200.0), (&p2, 300.0)] {
        c.dispatch(ServerEvent::PlotCreated {
            routine: "fit.py".into(),
            panel: id.clone(),
            url: format!("/plots/{id}.png"),
            size: Size::new(400.0, height),
        })
        .unwrap();
    }
    assert_eq!(c.view().row_height.value, 250.0);

    c.dispatch(UiEvent::TogglePanel(p2)).unwrap();
    assert_eq!(c.view().row_height.value, 200.0);
}

#[test]
fn removing_running_routine_stops_first() {
    let mut c = controller(DashboardConfig::default());
    let r = uploaded(&mut c, "fit.py");
    c.dispatch(UiEvent::RoutineClicked(r.clone())).unwrap();
    c.dispatch(UiEvent::RunSelected).unwrap();

    c.dispatch(UiEvent::RemoveSelected).unwrap();
    assert!(c.channel().position("remove_routine").is_none());
    assert!(c.view().confirmation.is_some());

    c.dispatch(UiEvent::Confirm(true)).unwrap();
    let stop = c.channel().position("stop_routine").expect("stop sent");
    let remove = c.channel().position("remove_routine").expect("remove sent");
    assert!(stop < remove);
    assert!(c.routines().is_empty());
    assert_eq!(c.status().last(), Some("'fit.py' removed."));

    // late push for the removed routine
    c.dispatch(ServerEvent::RoutineStatusChanged {
        id: r.clone(),
        status: StatusChange::Idle,
    })
    .unwrap();
    c.dispatch(ServerEvent::RoutinesRemoved { ids: vec![r] })
        .unwrap();
    assert!(c.routines().is_empty());
}

#[test]
fn idle_routine_removal_sends_no_stop() {
    let mut c = controller(DashboardConfig {
        confirm_destructive: false,
        ..DashboardConfig::default()
    });
    let r = uploaded(&mut c, "fit.py");
    c.dispatch(UiEvent::RoutineClicked(r)).unwrap();
    c.dispatch(UiEvent::RemoveSelected).unwrap();
    assert_eq!(c.channel().names(), vec!["add_routine", "remove_routine"]);
}

#[test]
fn removing_routine_drops_its_panels() {
    let mut c = controller(DashboardConfig {
        confirm_destructive: false,
        panels_start_visible: true,
        ..DashboardConfig::default()
    });
    let r = uploaded(&mut c, "fit.py");
    c.dispatch(ServerEvent::RoutineGroupCreated {
        routine: "fit.py".into(),
    })
    .unwrap();
    c.dispatch(ServerEvent::PlotCreated {
        routine: "fit.py".into(),
        panel: PanelId::for_plot("fit.py", "a", 0),
        url: "/a.png".into(),
        size: Size::new(300.0, 200.0),
    })
    .unwrap();
    assert_eq!(c.view().plot_list.len(), 1);

    c.dispatch(UiEvent::RoutineClicked(r)).unwrap();
    c.dispatch(UiEvent::RemoveSelected).unwrap();
    let view = c.view();
    assert!(view.plot_list.is_empty());
    assert!(view.panels.is_empty());
}

#[test]
fn drag_paint_selects_range() {
    let mut c = controller(DashboardConfig::default());
    let ids: Vec<RoutineId> = ["a.py", "b.py", "c.py"]
        .into_iter()
        .map(|n| uploaded(&mut c, n))
        .collect();

    c.dispatch(UiEvent::RoutineDragStart(ids[0].clone())).unwrap();
    c.dispatch(UiEvent::RoutineDragEnter(ids[1].clone())).unwrap();
    c.dispatch(UiEvent::RoutineDragEnter(ids[2].clone())).unwrap();
    c.dispatch(UiEvent::RoutineDragEnd).unwrap();
    assert!(c.buttons().select_all_checked);

    c.dispatch(UiEvent::RoutineClicked(ids[1].clone())).unwrap();
    assert!(!c.buttons().select_all_checked);
    assert_eq!(c.selection().len(), 2);
}

#[test]
fn grid_mode_flows_visible_panels() {
    let mut c = controller(DashboardConfig {
        panels_start_visible: true,
        ..DashboardConfig::default()
    });
    let a = PanelId::for_plot("fit.py", "a", 0);
    let b = PanelId::for_plot("fit.py", "b", 0);
    for id in [&a, &b] {
        c.dispatch(ServerEvent::PlotCreated {
            routine: "fit.py".into(),
            panel: id.clone(),
            url: "/p.png".into(),
            size: Size::new(400.0, 300.0),
        })
        .unwrap();
    }

    c.dispatch(UiEvent::ToggleGrid {
        rendered: Default::default(),
    })
    .unwrap();
    assert!(
        c.dispatch(UiEvent::DragStart {
            id: a.clone(),
            pointer: Default::default(),
        })
        .is_err()
    );

    c.dispatch(UiEvent::MoveInFlow { id: b.clone(), index: 0 })
        .unwrap();
    let view = c.view();
    let first = view.panels.iter().find(|p| p.id == b).unwrap();
    let second = view.panels.iter().find(|p| p.id == a).unwrap();
    assert!(first.position.x < second.position.x);
    assert_eq!(first.position.y, second.position.y);
}

#[test]
fn grid_rearrangement_survives_leaving_grid() {
    let mut c = controller(DashboardConfig {
        panels_start_visible: true,
        ..DashboardConfig::default()
    });
    let a = PanelId::for_plot("fit.py", "a", 0);
    let b = PanelId::for_plot("fit.py", "b", 0);
    for id in [&a, &b] {
        c.dispatch(ServerEvent::PlotCreated {
            routine: "fit.py".into(),
            panel: id.clone(),
            url: "/p.png".into(),
            size: Size::new(400.0, 300.0),
        })
        .unwrap();
    }
    let start = c.workspace().panel(&a).unwrap().position.unwrap();
    c.dispatch(UiEvent::DragStart { id: a.clone(), pointer: start }).unwrap();
    c.dispatch(UiEvent::DragMove(Point::new(700.0, 500.0))).unwrap();
    c.dispatch(UiEvent::DragEnd).unwrap();

    c.dispatch(UiEvent::ToggleGrid { rendered: Default::default() }).unwrap();
    c.dispatch(UiEvent::MoveInFlow { id: b.clone(), index: 0 }).unwrap();
    let in_grid = c.view().panels;
    let a_in_grid = in_grid.iter().find(|p| p.id == a).unwrap().position;
    assert_eq!(a_in_grid, Point::new(216.0, 8.0));

    c.dispatch(UiEvent::ToggleGrid { rendered: Default::default() }).unwrap();
    let after = c.view().panels;
    for panel in &in_grid {
        let now = after.iter().find(|p| p.id == panel.id).unwrap();
        assert_eq!(now.position, panel.position);
    }
    assert_eq!(c.workspace().panel(&a).unwrap().position, Some(a_in_grid));
}

#[test]
fn row_height_setting_holds_until_visible_set_changes() {
    let config = DashboardConfig {
        layout: LayoutConfig {
            viewport: Size::new(2000.0, 2000.0),
            initial_factor: 1.0,
            ..LayoutConfig::default()
        },
        panels_start_visible: true,
        ..DashboardConfig::default()
    };
    let mut c = controller(config);
    let ids: Vec<PanelId> = ["a", "b", "c"]
        .into_iter()
        .map(|name| PanelId::for_plot("fit.py", name, 0))
        .collect();
    for (id, height) in ids.iter().zip([200.0, 300.0, 400.0]) {
        c.dispatch(ServerEvent::PlotCreated {
            routine: "fit.py".into(),
            panel: id.clone(),
            url: "/p.png".into(),
            size: Size::new(400.0, height),
        })
        .unwrap();
    }
    c.dispatch(UiEvent::TogglePanel(ids[2].clone())).unwrap();

    c.dispatch(UiEvent::RowHeight(120.0)).unwrap();
    assert_eq!(c.view().row_height.value, 120.0);
    assert_eq!(c.workspace().panel(&ids[0]).unwrap().size.height, 120.0);
    assert_eq!(c.workspace().panel(&ids[2]).unwrap().size.height, 400.0);

    c.dispatch(UiEvent::TogglePanel(ids[2].clone())).unwrap();
    let value = c.view().row_height.value;
    assert!((value - 640.0 / 3.0).abs() < 1e-3, "slider at {value}");
}

#[test]
fn row_height_shows_mean_below_minimum_edge() {
    let config = DashboardConfig {
        layout: LayoutConfig {
            viewport: Size::new(2000.0, 2000.0),
            initial_factor: 1.0,
            ..LayoutConfig::default()
        },
        panels_start_visible: true,
        ..DashboardConfig::default()
    };
    let mut c = controller(config);
    c.dispatch(ServerEvent::PlotCreated {
        routine: "fit.py".into(),
        panel: PanelId::for_plot("fit.py", "strip", 0),
        url: "/p.png".into(),
        size: Size::new(400.0, 10.0),
    })
    .unwrap();

    let slider = c.view().row_height;
    assert_eq!(slider.value, 10.0);
    assert!(slider.min <= slider.value && slider.value <= slider.max);
}

#[test]
fn events_replay_from_json() {
    let script = json!([
        {"ui": {"upload_routine": "fit.py"}},
        {"server": {"routine_uploaded": {"id": "f1", "name": "fit.py"}}},
        {"ui": {"routine_clicked": "f1"}},
        {"ui": "run_selected"},
        "tick"
    ]);
    let events: Vec<Event> = serde_json::from_value(script).unwrap();

    let mut c = controller(DashboardConfig::default());
    for event in events {
        c.dispatch(event).unwrap();
    }
    assert_eq!(c.channel().names(), vec!["add_routine", "run_routine"]);
    assert_eq!(c.channel().calls[1].args, vec![json!("f1"), json!(false)]);
}
