//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` filesystem states for testing
//! process listing and file resolution.

use super::filesystem::MockFs;

/// Builds a `/proc/[pid]/stat` line with the given identity and RSS (pages).
pub fn stat_line(pid: u32, comm: &str, ppid: u32, rss: u64) -> String {
    format!(
        "{pid} ({comm}) S {ppid} {pid} {pid} 0 -1 4194304 1000 0 0 0 10 5 0 0 20 0 1 0 500 10000000 {rss} 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0"
    )
}

const SYSTEMD_MAPS: &str = "\
55a1b2c3d000-55a1b2c5e000 r--p 00000000 08:01 1310722    /usr/lib/systemd/systemd
55a1b2c5e000-55a1b2d2f000 r-xp 00021000 08:01 1310722    /usr/lib/systemd/systemd
55a1b3e8a000-55a1b40cc000 rw-p 00000000 00:00 0          [heap]
7f2c4c000000-7f2c4c021000 r-xp 00000000 08:01 131090     /usr/lib/x86_64-linux-gnu/libc.so.6
7ffd1b5e5000-7ffd1b606000 rw-p 00000000 00:00 0          [stack]
";

const POSTGRES_MAPS: &str = "\
5600aa000000-5600aa400000 r-xp 00000000 08:01 2621445    /usr/lib/postgresql/16/bin/postgres
7f0011000000-7f0015000000 rw-s 00000000 00:01 1024       /dev/zero (deleted)
7f0020000000-7f0020021000 r-xp 00000000 08:01 131090     /usr/lib/x86_64-linux-gnu/libc.so.6
7f0030000000-7f0030002000 r--s 00000000 08:01 3932161    /var/lib/postgresql/16/main/base/1/1259
7f0040000000-7f0040100000 rw-p 00000000 00:00 0
";

const BASH_MAPS: &str = "\
5612dd000000-5612dd0f0000 r-xp 00000000 08:01 1048590    /usr/bin/bash
7f9900000000-7f9900021000 r-xp 00000000 08:01 131090     /usr/lib/x86_64-linux-gnu/libc.so.6
";

impl MockFs {
    /// Creates a typical system with a few processes.
    ///
    /// Includes: systemd (PID 1), a kernel thread with zero RSS (PID 2),
    /// a postgres backend with data files open (PID 1000) and an interactive
    /// bash shell (PID 1001).
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        fs.add_process(
            1,
            &stat_line(1, "systemd", 0, 2000),
            SYSTEMD_MAPS,
            &[
                (0, "/dev/null"),
                (1, "socket:[14321]"),
                (3, "/var/log/journal/system.journal"),
            ],
        );

        fs.add_process(2, &stat_line(2, "kthreadd", 0, 0), "", &[]);

        fs.add_process(
            1000,
            &stat_line(1000, "postgres", 1, 50000),
            POSTGRES_MAPS,
            &[
                (0, "/dev/null"),
                (1, "pipe:[20001]"),
                (3, "/var/lib/postgresql/16/main/base/1/1259"),
                (4, "/var/lib/postgresql/16/main/base/1/2608"),
                (5, "socket:[30001]"),
                (6, "anon_inode:[eventpoll]"),
            ],
        );

        fs.add_process(
            1001,
            &stat_line(1001, "bash", 1, 800),
            BASH_MAPS,
            &[
                (0, "/dev/pts/0"),
                (1, "/dev/pts/0"),
                (2, "/dev/pts/0"),
                (255, "/home/user/.bash_history"),
            ],
        );

        fs
    }

    /// Creates a system where one process hides its fds and maps.
    ///
    /// PID 3000 has a stat file but no readable `fd` directory or `maps`
    /// file, as happens for processes owned by another user.
    pub fn with_restricted_process() -> Self {
        let mut fs = Self::typical_system();
        fs.add_file("/proc/3000/stat", stat_line(3000, "sshd", 1, 1200));
        fs
    }
}
