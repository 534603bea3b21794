//! Application state and its pure transition function

use serde::Serialize;

use crate::models::{ClimateSeries, Location, PollenReport, TemperatureUnit};
use crate::providers::{CurrentConditions, Suggestion};
use crate::resolution::{City, DeepLink, RequestId, ResolutionState};

/// A panel that loads after the main conditions
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Panel<T> {
    Loading,
    Ready(T),
    Unavailable(String),
}

impl<T> Panel<T> {
    #[must_use]
    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Everything rendered for one resolved location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub location: Location,
    pub link: DeepLink,
    pub conditions: CurrentConditions,
    pub pollen: Panel<PollenReport>,
    pub climate: Panel<ClimateSeries>,
}

impl DashboardView {
    #[must_use]
    pub fn new(location: Location, conditions: CurrentConditions) -> Self {
        Self {
            link: DeepLink::from_location(&location),
            location,
            conditions,
            pollen: Panel::Loading,
            climate: Panel::Loading,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppState {
    pub resolution: ResolutionState,
    /// Id of the most recently issued resolution; older results are dropped
    pub latest_request: RequestId,
    /// Last successfully loaded dashboard, kept across failures
    pub view: Option<DashboardView>,
    /// Request that rendered `view`; its panels keep filling in even after a
    /// newer request fails
    pub view_request: Option<RequestId>,
    /// One user-visible message for the last failure
    pub error: Option<String>,
    pub unit: TemperatureUnit,
    pub dark_mode: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            resolution: ResolutionState::Idle,
            latest_request: RequestId::default(),
            view: None,
            view_request: None,
            error: None,
            unit: TemperatureUnit::default(),
            dark_mode: true,
        }
    }
}

/// Discrete user actions
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Search(String),
    SelectSuggestion(Suggestion),
    Geolocate,
    SelectCity(City),
    OpenLink(DeepLink),
    Back,
    Forward,
    ToggleUnit,
    SetDarkMode(bool),
}

/// Outcomes fed back into the state
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ResolutionStarted {
        request: RequestId,
    },
    ResolutionFailed {
        request: RequestId,
        message: String,
    },
    ConditionsLoaded {
        request: RequestId,
        location: Location,
        conditions: CurrentConditions,
    },
    PollenLoaded {
        request: RequestId,
        pollen: Panel<PollenReport>,
    },
    ClimateLoaded {
        request: RequestId,
        climate: Panel<ClimateSeries>,
    },
    UnitToggled,
    DarkModeSet(bool),
}

impl Event {
    /// Resolution this event belongs to, if any
    #[must_use]
    pub fn request(&self) -> Option<RequestId> {
        match self {
            Event::ResolutionStarted { request }
            | Event::ResolutionFailed { request, .. }
            | Event::ConditionsLoaded { request, .. }
            | Event::PollenLoaded { request, .. }
            | Event::ClimateLoaded { request, .. } => Some(*request),
            Event::UnitToggled | Event::DarkModeSet(_) => None,
        }
    }
}

/// Whether `event` would change `state` rather than be discarded as stale
#[must_use]
pub fn is_current(state: &AppState, event: &Event) -> bool {
    match (event, event.request()) {
        (Event::ResolutionStarted { request }, _) => *request > state.latest_request,
        (Event::PollenLoaded { request, .. } | Event::ClimateLoaded { request, .. }, _) => {
            state.view_request == Some(*request)
        }
        (_, Some(request)) => request == state.latest_request,
        (_, None) => true,
    }
}

/// Apply one event. Results of superseded resolutions leave the state as is.
#[must_use]
pub fn apply(mut state: AppState, event: Event) -> AppState {
    if !is_current(&state, &event) {
        return state;
    }

    match event {
        Event::ResolutionStarted { request } => {
            state.latest_request = request;
            state.resolution = ResolutionState::Resolving { request };
        }
        Event::ResolutionFailed { message, .. } => {
            state.resolution = ResolutionState::Failed {
                message: message.clone(),
            };
            state.error = Some(message);
        }
        Event::ConditionsLoaded {
            request,
            location,
            conditions,
        } => {
            state.view = Some(DashboardView::new(location.clone(), conditions));
            state.view_request = Some(request);
            state.resolution = ResolutionState::Resolved { location };
            state.error = None;
        }
        Event::PollenLoaded { pollen, .. } => {
            if let Some(view) = state.view.as_mut() {
                view.pollen = pollen;
            }
        }
        Event::ClimateLoaded { climate, .. } => {
            if let Some(view) = state.view.as_mut() {
                view.climate = climate;
            }
        }
        Event::UnitToggled => state.unit = state.unit.toggled(),
        Event::DarkModeSet(enabled) => state.dark_mode = enabled,
    }
    state
}
