use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{CareAction, Notification, Plant};
use crate::store::{KeyValueStore, Repository};

/// Age from which seedlings are due for transplanting and feeding.
pub const MATURE_AGE_DAYS: i64 = 14;

pub fn water_title(plant: &Plant) -> String {
    format!("Waktunya Menyiram - {}", plant.name)
}

struct Due {
    title: String,
    message: String,
    action: CareAction,
    repeat_days: Option<u32>,
}

/// Reminders that are due for one plant at `now`, before de-duplication.
fn due_reminders<S: KeyValueStore>(
    repo: &Repository<S>,
    plant: &Plant,
    now: DateTime<Utc>,
) -> Result<Vec<Due>> {
    let age = plant.age_days(now);
    let today = now.date_naive();
    let mut due = Vec::new();

    if age >= MATURE_AGE_DAYS {
        due.push(Due {
            title: format!("Pindahkan Bibit - {}", plant.name),
            message: format!("Sudah {age} hari sejak semai."),
            action: CareAction::Move,
            repeat_days: None,
        });
    }

    let water = water_title(plant);
    if !repo.is_done(CareAction::Water, &water, today)? {
        due.push(Due {
            title: water,
            message: "Jangan lupa menyiram tanaman!".to_string(),
            action: CareAction::Water,
            repeat_days: Some(1),
        });
    }

    if age >= MATURE_AGE_DAYS && age % 7 == 0 {
        due.push(Due {
            title: format!("Beri Pestisida Nabati - {}", plant.name),
            message: "Saatnya memberi pestisida.".to_string(),
            action: CareAction::Pesticide,
            repeat_days: Some(7),
        });
    }

    if age >= MATURE_AGE_DAYS && (age % 7 == 0 || age % 10 == 0) {
        due.push(Due {
            title: format!("Beri Pupuk NPK 16 - {}", plant.name),
            message: "Jangan lupa beri pupuk.".to_string(),
            action: CareAction::Fertilizer,
            repeat_days: Some(if age % 10 == 0 { 10 } else { 7 }),
        });
    }

    Ok(due)
}

/// Inserts a reminder at the front unless one with the same title already
/// exists for the plant. The key carries no date: an uncompleted reminder
/// keeps blocking its successors on later days.
pub fn schedule_notification(
    notifications: &mut Vec<Notification>,
    title: String,
    message: String,
    plant_id: Uuid,
    action: CareAction,
    repeat_days: Option<u32>,
    now: DateTime<Utc>,
) -> Option<Notification> {
    let exists = notifications
        .iter()
        .any(|n| n.title == title && n.plant_id == plant_id);
    if exists {
        return None;
    }
    let notif = Notification::new(title, message, plant_id, action, repeat_days, now);
    notifications.insert(0, notif.clone());
    Some(notif)
}

/// Derives due reminders for every plant and stores the new ones. Returns
/// the reminders created by this run.
pub fn check_notifications<S: KeyValueStore>(
    repo: &mut Repository<S>,
    now: DateTime<Utc>,
) -> Result<Vec<Notification>> {
    let plants = repo.plants()?;
    let mut notifications = repo.notifications()?;
    let mut created = Vec::new();

    for plant in &plants {
        for due in due_reminders(repo, plant, now)? {
            let scheduled = schedule_notification(
                &mut notifications,
                due.title,
                due.message,
                plant.id,
                due.action,
                due.repeat_days,
                now,
            );
            if let Some(n) = scheduled {
                debug!(title = %n.title, plant = %plant.name, "reminder scheduled");
                created.push(n);
            }
        }
    }

    if !created.is_empty() {
        repo.save_notifications(&notifications)?;
        info!(count = created.len(), "new reminders");
    }
    Ok(created)
}

/// Runs the check once immediately and then every `period` until `shutdown`
/// resolves. The store is reopened on each tick so writes made by other
/// invocations are picked up. A failing tick is logged and the loop goes on.
pub async fn run<S, O, F, Fut>(period: Duration, open: O, mut on_tick: F, shutdown: Fut)
where
    S: KeyValueStore,
    O: Fn() -> Result<Repository<S>>,
    F: FnMut(&Repository<S>, &[Notification]),
    Fut: Future<Output = ()>,
{
    info!(period_secs = period.as_secs(), "reminder check started");
    let mut interval = tokio::time::interval(period);
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let tick = open().and_then(|mut repo| {
                    let created = check_notifications(&mut repo, Utc::now())?;
                    Ok((repo, created))
                });
                match tick {
                    Ok((repo, created)) => on_tick(&repo, &created),
                    Err(e) => error!("reminder check failed: {e}"),
                }
            }
            _ = &mut shutdown => {
                info!("reminder check stopped");
                break;
            }
        }
    }
}
