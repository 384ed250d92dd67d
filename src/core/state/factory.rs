//=========================================================================
// Restore Factories
//=========================================================================
//
// Application-supplied registries mapping saved class identifiers back
// to instances. Unknown identifiers are a versioning bug in the host and
// must be reported, never skipped.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::rc::Rc;

//=== Internal Dependencies ===============================================

use super::SavedState;
use crate::core::navigator::Navigator;
use crate::error::Result;

//=== SceneFactory ========================================================

/// Rebuilds scenes from their saved class identifier and state.
///
/// Implemented for any closure of the matching shape:
///
/// ```rust
/// # use std::rc::Rc;
/// # use aetheric_navigation::prelude::*;
/// struct Home;
/// impl Scene for Home {
///     fn class_name(&self) -> &str { "home" }
/// }
///
/// let factory = |class_name: &str, _state: Option<&SavedState>| -> Result<Rc<dyn Scene>, NavigatorError> {
///     match class_name {
///         "home" => Ok(Rc::new(Home)),
///         other => Err(NavigatorError::unknown_class(other)),
///     }
/// };
/// # let _ = SceneFactory::<dyn Scene>::instantiate_scene(&factory, "home", None);
/// ```
pub trait SceneFactory<S: ?Sized> {
    fn instantiate_scene(&self, class_name: &str, state: Option<&SavedState>) -> Result<Rc<S>>;
}

impl<S, F> SceneFactory<S> for F
where
    S: ?Sized,
    F: Fn(&str, Option<&SavedState>) -> Result<Rc<S>>,
{
    fn instantiate_scene(&self, class_name: &str, state: Option<&SavedState>) -> Result<Rc<S>> {
        self(class_name, state)
    }
}

//=== NavigatorFactory ====================================================

/// Rebuilds child navigators of a composite navigator.
///
/// The returned navigator is typically itself restored from `state`.
pub trait NavigatorFactory<S: ?Sized> {
    fn instantiate_navigator(
        &self,
        class_name: &str,
        state: Option<&SavedState>,
    ) -> Result<Rc<dyn Navigator<S>>>;
}

impl<S, F> NavigatorFactory<S> for F
where
    S: ?Sized,
    F: Fn(&str, Option<&SavedState>) -> Result<Rc<dyn Navigator<S>>>,
{
    fn instantiate_navigator(
        &self,
        class_name: &str,
        state: Option<&SavedState>,
    ) -> Result<Rc<dyn Navigator<S>>> {
        self(class_name, state)
    }
}
