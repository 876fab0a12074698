use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{capitalize, Notification, Permission, Plant};
use crate::store::{KeyValueStore, Repository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Register,
    Home,
}

/// Home is shown once a user name has been stored.
pub fn gate<S: KeyValueStore>(repo: &Repository<S>) -> Result<Page> {
    Ok(match repo.user()? {
        Some(user) if !user.is_empty() => Page::Home,
        _ => Page::Register,
    })
}

/// Stores the trimmed name and re-runs the gate. A blank name is refused
/// without error.
pub fn register<S: KeyValueStore>(repo: &mut Repository<S>, name: &str) -> Result<Page> {
    let name = name.trim();
    if name.is_empty() {
        debug!("blank user name refused");
    } else {
        repo.set_user(name)?;
        info!(user = name, "user registered");
    }
    gate(repo)
}

pub fn add_plant<S: KeyValueStore>(
    repo: &mut Repository<S>,
    name: &str,
    date: &str,
) -> Result<Plant> {
    let name = name.trim();
    let date = date.trim();
    if name.is_empty() || date.is_empty() {
        return Err(Error::MissingField);
    }
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| Error::InvalidDate(date.to_string()))?;

    let plant = Plant::new(capitalize(name), date);
    let mut plants = repo.plants()?;
    plants.push(plant.clone());
    repo.save_plants(&plants)?;
    info!(plant = %plant.name, id = %plant.id, sown = %plant.date, "plant added");
    Ok(plant)
}

/// Resolves a reminder: flips the plant flag for its action, records today's
/// done marker, stores the next due time when the reminder repeats, and drops
/// it from the active list.
pub fn complete_notification<S: KeyValueStore>(
    repo: &mut Repository<S>,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<Notification> {
    let mut notifications = repo.notifications()?;
    let mut plants = repo.plants()?;

    let position = notifications
        .iter()
        .position(|n| n.id == id)
        .ok_or(Error::NotificationNotFound { id })?;
    let notif = notifications.remove(position);

    match plants.iter_mut().find(|p| p.id == notif.plant_id) {
        Some(plant) => plant.mark(notif.action),
        None => warn!(plant_id = %notif.plant_id, "reminder references a missing plant"),
    }

    let today = now.date_naive();
    repo.mark_done(notif.action, &notif.title, today)?;

    // Written for bookkeeping; nothing schedules from it.
    if let Some(days) = notif.repeat_days.filter(|d| *d > 0) {
        repo.set_next_due(notif.action, &notif.title, now + Duration::days(i64::from(days)))?;
    }

    repo.save_notifications(&notifications)?;
    repo.save_plants(&plants)?;
    info!(title = %notif.title, action = %notif.action, "reminder completed");
    Ok(notif)
}

/// Flips the archive panel preference and returns the new visibility.
pub fn toggle_archive<S: KeyValueStore>(repo: &mut Repository<S>) -> Result<bool> {
    let show = !repo.show_archive()?;
    repo.set_show_archive(show)?;
    Ok(show)
}

/// Asks for notification permission while it is still undecided. `ask`
/// returns `Ok(Some(granted))` on an answer, `Ok(None)` when nobody can be
/// asked. Failures are logged and leave the permission untouched.
pub fn request_permission<S, F>(repo: &mut Repository<S>, ask: F) -> Permission
where
    S: KeyValueStore,
    F: FnOnce() -> std::io::Result<Option<bool>>,
{
    let current = match repo.permission() {
        Ok(p) => p,
        Err(e) => {
            warn!("reading notification permission failed: {e}");
            return Permission::Default;
        }
    };
    if current != Permission::Default {
        return current;
    }

    let decided = match ask() {
        Ok(Some(true)) => Permission::Granted,
        Ok(Some(false)) => Permission::Denied,
        Ok(None) => return current,
        Err(e) => {
            warn!("notification permission prompt failed: {e}");
            return current;
        }
    };
    if let Err(e) = repo.set_permission(decided) {
        warn!("storing notification permission failed: {e}");
    }
    decided
}
