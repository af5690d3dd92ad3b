//! Systemd unit and exports rendering
//!
//! Four artifacts are generated per deployment:
//! - client `.mount` units (NFS mount with a wake hook)
//! - client `.automount` units (on-demand activation)
//! - the server watcher service
//! - the server exports file
//!
//! Templates are embedded as plain text with `{name}` placeholders; the
//! emitted bytes are a contract (the deployer diffs them against installed
//! files), so rendering is deterministic substitution, nothing clever.

use std::process::Command;

/// Default NFS mount options for client `.mount` units
pub const DEFAULT_MOUNT_OPTIONS: &str = "rw,soft,timeo=100,retrans=3,actimeo=60";

const CLIENT_MOUNT_TMPL: &str = "[Unit]
Description=AutoNFS Mount for {remote_dir}
After=network.target

[Mount]
What={server_ip}:{remote_dir}
Where={local_dir}
Type=nfs
Options={options}
ExecStartPre={binary_path} wake --mac \"{mac}\" --ip \"{server_ip}\" --port 2049 --timeout 10s
";

// The mount unit deliberately has no [Install] section: it must only ever be
// activated by its automount unit, never enabled directly.

const CLIENT_AUTOMOUNT_TMPL: &str = "[Unit]
Description=Automount for {local_dir}

[Automount]
Where={local_dir}
TimeoutIdleSec={idle_timeout}

[Install]
WantedBy=multi-user.target
";

const SERVER_SERVICE_TMPL: &str = "[Unit]
Description=AutoNFS Idle Watcher
After=network.target nfs-server.service

[Service]
Type=simple
ExecStart={binary_path} watch --timeout {idle_timeout} --load {load_threshold}{dry_run_flag}
Restart=always
RestartSec=10

[Install]
WantedBy=multi-user.target
";

/// One exports-file line: a remote path granted to a client IP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    pub path: String,
    pub client_ip: String,
}

/// Variable bundle the renderer consumes.
///
/// The deployer builds one per host apply and fills the per-mount fields
/// while looping over mounts.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    pub server_ip: String,
    pub client_ip: String,
    pub mac: String,
    pub binary_path: String,
    pub remote_dir: String,
    pub local_dir: String,
    /// Mount options override; `DEFAULT_MOUNT_OPTIONS` when `None`
    pub mount_options: Option<String>,
    pub idle_timeout: String,
    pub wake_timeout: String,
    pub load_threshold: String,
    pub watcher_dry_run: bool,
    /// Ordered exports for the server exports file
    pub exports: Vec<ExportEntry>,
}

/// Render the client `.mount` unit
pub fn render_mount(ctx: &RenderContext) -> String {
    let options = ctx
        .mount_options
        .as_deref()
        .unwrap_or(DEFAULT_MOUNT_OPTIONS);
    CLIENT_MOUNT_TMPL
        .replace("{remote_dir}", &ctx.remote_dir)
        .replace("{server_ip}", &ctx.server_ip)
        .replace("{local_dir}", &ctx.local_dir)
        .replace("{options}", options)
        .replace("{binary_path}", &ctx.binary_path)
        .replace("{mac}", &ctx.mac)
}

/// Render the client `.automount` unit
pub fn render_automount(ctx: &RenderContext) -> String {
    CLIENT_AUTOMOUNT_TMPL
        .replace("{local_dir}", &ctx.local_dir)
        .replace("{idle_timeout}", &ctx.idle_timeout)
}

/// Render the server watcher service unit
pub fn render_watcher_service(ctx: &RenderContext) -> String {
    let dry_run_flag = if ctx.watcher_dry_run { " --dry-run" } else { "" };
    SERVER_SERVICE_TMPL
        .replace("{binary_path}", &ctx.binary_path)
        .replace("{idle_timeout}", &ctx.idle_timeout)
        .replace("{load_threshold}", &ctx.load_threshold)
        .replace("{dry_run_flag}", dry_run_flag)
}

/// Render the server exports file, one line per export
pub fn render_exports(ctx: &RenderContext) -> String {
    let mut out = String::new();
    for export in &ctx.exports {
        out.push_str(&format!(
            "{} {}(rw,sync,no_subtree_check,no_root_squash)\n",
            export.path, export.client_ip
        ));
    }
    out
}

/// Convert a mount-point path to its systemd unit name.
///
/// Delegates to `systemd-escape --path` when available so the name is
/// bit-accurate with what systemd expects; otherwise falls back to the
/// native implementation of the same algorithm.
pub fn escape_unit_path(path: &str) -> String {
    if let Ok(output) = Command::new("systemd-escape").arg("--path").arg(path).output() {
        if output.status.success() {
            let escaped = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !escaped.is_empty() {
                return escaped;
            }
        }
    }
    escape_path_native(path)
}

/// Native systemd path escaping: strip surrounding slashes, map internal
/// `/` to `-`, hex-escape every byte outside `[a-zA-Z0-9:_.]` plus any
/// leading dot.
fn escape_path_native(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return "-".to_string();
    }

    let mut out = String::with_capacity(trimmed.len());
    for (i, b) in trimmed.bytes().enumerate() {
        let plain = b.is_ascii_alphanumeric() || b == b':' || b == b'_' || (b == b'.' && i != 0);
        if b == b'/' {
            out.push('-');
        } else if plain {
            out.push(b as char);
        } else {
            out.push_str(&format!("\\x{b:02x}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_context() -> RenderContext {
        RenderContext {
            server_ip: "192.168.1.50".to_string(),
            client_ip: "192.168.1.10".to_string(),
            mac: "AA:BB:CC:DD:EE:FF".to_string(),
            binary_path: "/usr/bin/autonfs".to_string(),
            remote_dir: "/data".to_string(),
            local_dir: "/mnt/data".to_string(),
            mount_options: None,
            idle_timeout: "30m".to_string(),
            wake_timeout: "120s".to_string(),
            load_threshold: "0.5".to_string(),
            watcher_dry_run: false,
            exports: vec![],
        }
    }

    #[test]
    fn test_render_mount_exact_fields() {
        let output = render_mount(&base_context());

        assert!(output.contains("What=192.168.1.50:/data"));
        assert!(output.contains("Where=/mnt/data"));
        assert!(output.contains("Type=nfs"));
        assert!(output.contains("Options=rw,soft,timeo=100,retrans=3,actimeo=60"));
        let wake_hook = "ExecStartPre=/usr/bin/autonfs wake --mac \"AA:BB:CC:DD:EE:FF\" --ip \"192.168.1.50\" --port 2049 --timeout 10s";
        assert!(output.contains(wake_hook));
        // Must not be directly enableable
        assert!(!output.contains("[Install]"));
    }

    #[test]
    fn test_render_mount_custom_options() {
        let mut ctx = base_context();
        ctx.mount_options = Some("rw,hard,noatime".to_string());
        let output = render_mount(&ctx);
        assert!(output.contains("Options=rw,hard,noatime"));
        assert!(!output.contains("timeo=100"));
    }

    #[test]
    fn test_render_automount() {
        let output = render_automount(&base_context());
        assert!(output.contains("Where=/mnt/data"));
        assert!(output.contains("TimeoutIdleSec=30m"));
        assert!(output.contains("WantedBy=multi-user.target"));
    }

    #[test]
    fn test_render_watcher_service() {
        let output = render_watcher_service(&base_context());
        assert!(output.contains("Type=simple"));
        assert!(output
            .contains("ExecStart=/usr/bin/autonfs watch --timeout 30m --load 0.5\n"));
        assert!(output.contains("Restart=always"));
        assert!(output.contains("RestartSec=10"));
        assert!(output.contains("WantedBy=multi-user.target"));
        assert!(!output.contains("--dry-run"));
    }

    #[test]
    fn test_render_watcher_service_dry_run() {
        let mut ctx = base_context();
        ctx.watcher_dry_run = true;
        let output = render_watcher_service(&ctx);
        assert!(output.contains("--load 0.5 --dry-run\n"));
    }

    #[test]
    fn test_render_exports() {
        let mut ctx = base_context();
        ctx.exports = vec![
            ExportEntry {
                path: "/srv/data".to_string(),
                client_ip: "192.168.1.10".to_string(),
            },
            ExportEntry {
                path: "/srv/media".to_string(),
                client_ip: "192.168.1.10".to_string(),
            },
        ];
        let output = render_exports(&ctx);
        assert_eq!(
            output,
            "/srv/data 192.168.1.10(rw,sync,no_subtree_check,no_root_squash)\n\
             /srv/media 192.168.1.10(rw,sync,no_subtree_check,no_root_squash)\n"
        );
    }

    #[test]
    fn test_escape_path_native() {
        assert_eq!(escape_path_native("/mnt/data"), "mnt-data");
        assert_eq!(escape_path_native("mnt/data"), "mnt-data");
        assert_eq!(escape_path_native("/var/lib/my-app"), "var-lib-my\\x2dapp");
        assert_eq!(
            escape_path_native("/home/user/nc-disk/data"),
            "home-user-nc\\x2ddisk-data"
        );
        assert_eq!(escape_path_native("/"), "-");
        assert_eq!(escape_path_native(""), "-");
    }

    #[test]
    fn test_escape_path_native_leading_dot() {
        // Only a dot at the very start of the unit name needs escaping
        assert_eq!(escape_path_native(".hidden"), "\\x2ehidden");
        assert_eq!(escape_path_native("/mnt/.cache"), "mnt-.cache");
    }
}
