use crate::ui::ViewShell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Lyrics,
    Home,
}

/// Minimal router: remembers the page title and the last navigation request.
#[derive(Debug, Default)]
pub struct RouterShell {
    title: String,
    route: Route,
    pending: Option<Route>,
}

impl RouterShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Navigation requested since the last call, if any.
    pub fn take_navigation(&mut self) -> Option<Route> {
        self.pending.take()
    }

    pub fn navigate(&mut self, route: Route) {
        tracing::debug!(?route, "navigate");
        self.route = route;
        self.pending = Some(route);
    }
}

impl ViewShell for RouterShell {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn go_home(&mut self) {
        self.navigate(Route::Home);
    }
}
