use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "fujiwara")]
#[command(about = "Pengingat perawatan bibit: siram, pestisida, pupuk, pindah tanam")]
pub struct Cli {
    /// File penyimpanan (JSON)
    #[arg(long, global = true, env = "FUJIWARA_STORE")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Daftar pengguna (cukup sekali)
    Register {
        /// Nama pengguna
        #[arg(short = 'n', long = "name")]
        name: String,
    },
    /// Tampilkan tanaman dan notifikasi
    Home,
    /// Tambah tanaman baru
    Add(AddArgs),
    /// Tampilkan daftar tanaman
    Plants,
    /// Tampilkan notifikasi aktif dan yang sudah ditangani hari ini
    Notifications,
    /// Cek pengingat sekali lalu tampilkan notifikasi
    Check,
    /// Tandai notifikasi selesai
    Done {
        /// ID notifikasi
        #[arg(long)]
        id: Uuid,
    },
    /// Tampilkan/sembunyikan notifikasi yang sudah ditangani
    ToggleArchive,
    /// Cek pengingat secara berkala sampai Ctrl-C
    Watch(WatchArgs),
    /// Teruskan pesan push (JSON per baris) menjadi notifikasi
    Relay {
        /// Baca dari file, bukan stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Atur izin notifikasi
    Permission {
        #[arg(value_enum)]
        decision: Decision,
    },
}

impl Commands {
    /// Home-page commands wait for a registered user. The push relay and the
    /// permission setting work without one.
    pub fn needs_registration(&self) -> bool {
        match self {
            Commands::Register { .. } | Commands::Relay { .. } | Commands::Permission { .. } => {
                false
            }
            Commands::Home
            | Commands::Add(_)
            | Commands::Plants
            | Commands::Notifications
            | Commands::Check
            | Commands::Done { .. }
            | Commands::ToggleArchive
            | Commands::Watch(_) => true,
        }
    }
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Nama tanaman
    #[arg(short = 'n', long = "name", default_value = "")]
    pub name: String,
    /// Tanggal semai (YYYY-MM-DD)
    #[arg(short = 'd', long = "date", default_value = "")]
    pub date: String,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Jeda antar pengecekan, dalam detik
    #[arg(
        long,
        default_value_t = 30,
        env = "FUJIWARA_INTERVAL_SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_secs: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Decision {
    Grant,
    Deny,
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_accepts_missing_fields_for_validation_later() {
        let cli = Cli::try_parse_from(["fujiwara", "add", "--name", "tomat"]).unwrap();
        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.name, "tomat");
                assert_eq!(args.date, "");
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn watch_defaults_to_thirty_seconds() {
        let cli = Cli::try_parse_from(["fujiwara", "watch"]).unwrap();
        match cli.command {
            Commands::Watch(args) => assert_eq!(args.interval_secs, 30),
            _ => panic!("expected watch"),
        }
        assert!(Cli::try_parse_from(["fujiwara", "watch", "--interval-secs", "0"]).is_err());
    }

    #[test]
    fn done_requires_a_uuid() {
        assert!(Cli::try_parse_from(["fujiwara", "done", "--id", "3"]).is_err());
        let id = Uuid::new_v4().to_string();
        let cli =
            Cli::try_parse_from(["fujiwara", "--store", "x.json", "done", "--id", &id]).unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("x.json")));
    }

    fn command(args: &[&str]) -> Commands {
        let argv = std::iter::once("fujiwara").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn relay_and_permission_skip_registration() {
        assert!(!command(&["register", "--name", "Sari"]).needs_registration());
        assert!(!command(&["relay"]).needs_registration());
        assert!(!command(&["relay", "--file", "push.jsonl"]).needs_registration());
        assert!(!command(&["permission", "grant"]).needs_registration());

        let id = Uuid::new_v4().to_string();
        let home: [&[&str]; 8] = [
            &["home"],
            &["add", "--name", "tomat"],
            &["plants"],
            &["notifications"],
            &["check"],
            &["done", "--id", id.as_str()],
            &["toggle-archive"],
            &["watch"],
        ];
        for args in home {
            assert!(command(args).needs_registration(), "{args:?}");
        }
    }
}
