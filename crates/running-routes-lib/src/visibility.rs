//! Route visibility keyed by route name, and the profile view derived from it

use crate::{ElevationProfile, Rgb, Route, RouteLibrary};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Explicit route-name to visibility mapping
///
/// Unknown names are never inserted implicitly: toggling or querying a name that is not
/// part of the map is a no-op that reports "hidden".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Visibility {
    flags: BTreeMap<String, bool>,
}

impl Visibility {
    /// Every given route visible
    pub fn all_visible<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            flags: names.into_iter().map(|n| (n.to_string(), true)).collect(),
        }
    }

    pub fn show_all(&mut self) {
        self.flags.values_mut().for_each(|v| *v = true);
    }

    pub fn hide_all(&mut self) {
        self.flags.values_mut().for_each(|v| *v = false);
    }

    /// Flip one route, returning its new state
    pub fn toggle(&mut self, name: &str) -> bool {
        match self.flags.get_mut(name) {
            Some(visible) => {
                *visible = !*visible;
                *visible
            }
            None => false,
        }
    }

    /// Set one known route's state
    pub fn set(&mut self, name: &str, visible: bool) {
        if let Some(flag) = self.flags.get_mut(name) {
            *flag = visible;
        }
    }

    #[inline]
    pub fn is_visible(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Names of visible routes, sorted
    pub fn visible_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.flags
            .iter()
            .filter(|&(_, &visible)| visible)
            .map(|(name, _)| name.as_str())
    }

    pub fn visible_count(&self) -> usize {
        self.flags.values().filter(|&&v| v).count()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Align with the current set of route names
    ///
    /// New names start visible, names that disappeared are dropped, and existing names
    /// keep their state.
    pub fn sync_with<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        let mut flags = BTreeMap::new();
        for name in names {
            let visible = self.flags.get(name).copied().unwrap_or(true);
            flags.insert(name.to_string(), visible);
        }
        self.flags = flags;
    }
}

/// One line of the elevation chart
///
/// Shares the library's route instead of copying its profile.
#[derive(Clone, Debug)]
pub struct ProfileSeries {
    route: Arc<Route>,
}

impl ProfileSeries {
    #[inline]
    pub fn name(&self) -> &str {
        self.route.name()
    }

    pub fn label(&self) -> String {
        self.route.label()
    }

    #[inline]
    pub fn color(&self) -> Rgb {
        self.route.color()
    }

    #[inline]
    pub fn profile(&self) -> &ElevationProfile {
        self.route.profile()
    }

    #[inline]
    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }
}

/// The elevation chart content for the current visibility
///
/// Returns one series per visible route, in sorted route order. Neither input is
/// modified.
pub fn visible_profiles(library: &RouteLibrary, visibility: &Visibility) -> Vec<ProfileSeries> {
    library
        .routes()
        .iter()
        .filter(|route| visibility.is_visible(route.name()))
        .map(|route| ProfileSeries {
            route: Arc::clone(route),
        })
        .collect()
}
