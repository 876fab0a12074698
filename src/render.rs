use std::fmt;

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Notification, Plant};
use crate::store::{KeyValueStore, Repository};

fn check(flag: bool) -> &'static str {
    if flag {
        "✅"
    } else {
        "❌"
    }
}

/// Plant cards ordered by sowing date. Stored order is left untouched.
pub struct PlantList<'a> {
    sorted: Vec<&'a Plant>,
}

impl<'a> PlantList<'a> {
    pub fn new(plants: &'a [Plant]) -> Self {
        let mut sorted: Vec<&Plant> = plants.iter().collect();
        sorted.sort_by_key(|p| p.date);
        Self { sorted }
    }
}

impl fmt::Display for PlantList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for plant in &self.sorted {
            writeln!(f, "{}", plant.name)?;
            writeln!(f, "  Tanggal Semai: {}", plant.date)?;
            writeln!(f, "  💧 Disiram: {}", check(plant.watered))?;
            writeln!(f, "  🐜 Pestisida: {}", check(plant.pesticide))?;
            writeln!(f, "  🌱 Pupuk: {}", check(plant.fertilizer))?;
            writeln!(f, "  🪴 Dipindahkan: {}", check(plant.moved))?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Reminder cards split into the ones still open and the ones already
/// handled today.
#[derive(Debug)]
pub struct NotificationBoard {
    pub active: Vec<Notification>,
    pub archived: Vec<Notification>,
    pub show_archive: bool,
}

impl NotificationBoard {
    pub fn build<S: KeyValueStore>(repo: &Repository<S>, today: NaiveDate) -> Result<Self> {
        let mut active = Vec::new();
        let mut archived = Vec::new();
        for notif in repo.notifications()? {
            if repo.is_done(notif.action, &notif.title, today)? {
                archived.push(notif);
            } else {
                active.push(notif);
            }
        }
        Ok(Self {
            active,
            archived,
            show_archive: repo.show_archive()?,
        })
    }
}

fn card(f: &mut fmt::Formatter<'_>, notif: &Notification, enabled: bool) -> fmt::Result {
    writeln!(f, "{}", notif.title)?;
    writeln!(f, "  {}", notif.message)?;
    writeln!(f, "  {}", notif.date)?;
    if enabled {
        writeln!(f, "  [Selesai] fujiwara done --id {}", notif.id)
    } else {
        writeln!(f, "  [Selesai]")
    }
}

impl fmt::Display for NotificationBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Notifikasi ({})", self.active.len())?;
        if self.active.is_empty() {
            writeln!(f, "  Tidak ada pengingat.")?;
        }
        for notif in &self.active {
            card(f, notif, true)?;
        }

        writeln!(f)?;
        if self.show_archive {
            writeln!(f, "Sudah ditangani hari ini ({}) [hidden]", self.archived.len())?;
            for notif in &self.archived {
                card(f, notif, false)?;
            }
        } else {
            writeln!(f, "Sudah ditangani hari ini ({}) [show]", self.archived.len())?;
        }
        Ok(())
    }
}
