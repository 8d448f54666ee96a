use std::path::Path;

use anyhow::{Context, Error};
use indoc::indoc;

use osutils::{files, path::join_relative, template::TemplateFile};

const UPDATE_SCRIPT_PATH: &str = "/usr/local/bin/dynudns.sh";
const SERVICE_UNIT_PATH: &str = "/lib/systemd/system/dynudns.service";
const SERVICE_LINK_PATH: &str = "/etc/systemd/system/multi-user.target.wants/dynudns.service";
const CRON_JOB_PATH: &str = "/etc/cron.hourly/dynudns";
const DHCPCD_HOOK_PATH: &str = "/lib/dhcpcd/dhcpcd-hooks/ddnsupdate";

const UPDATE_SCRIPT: &str = indoc! {r#"
    #!/bin/bash
    # Dynu DNS - Service for dynamic IP
    #
    #    IP Update Protocol
    #    https://www.dynu.com/en-US/DynamicDNS/IP-Update-Protocol
    #
    #    http://api.dynu.com/nic/update?myip=${}&username=${}&password=${}
    #      myip            The IP to store into the DDNS
    #      username        Account username
    #      password        A MD5 sum of the password string

    username="{{user}}"
    password="{{pass}}"
    uri="http://api.dynu.com/nic/update"
    passmd5="$(echo -n ${password} | md5sum - | awk '{print $1;}')"
    ip="$(hostname -I | awk '{print $NF;exit}')"
    uri="${uri}?myip=${ip}&username=${username}&password=${passmd5}"

    if [ "${username}" == "" ]; then
        logger -t "DDNS" -i "DDNS credentials not set! Aborting..."
        exit 1
    fi

    reply="$(curl -s ${uri})"
    logger -t "DDNS" -i "${uri} : ${reply}"
"#};

const SERVICE_UNIT: &str = indoc! {r#"
    [Unit]
    Description=DynuDNS, free dynamic IP service.
    After=network-online.target
    Wants=network-online.target

    [Service]
    Type=simple
    ExecStart=/bin/bash /usr/local/bin/dynudns.sh

    [Install]
    WantedBy=multi-user.target
"#};

const CRON_JOB: &str = indoc! {r#"
    #!/bin/bash
    #
    # Execute DynuDNS script to update IP into the DDNS
    #

    /usr/local/bin/dynudns.sh
"#};

// Raspbian runs dhcpcd, so the hook goes into /lib/dhcpcd/dhcpcd-hooks
// (not /etc/dhcp/dhclient-exit-hooks.d).
const DHCPCD_HOOK: &str = indoc! {r#"
    #!/bin/bash
    TAG="DH client hook"
    NIC="eth0"
    CMD="/usr/local/bin/dynudns.sh"

    # Disregard changes in other interfaces
    if [ "$interface" != "$NIC" ]; then
            exit 0
    fi

    case "$reason" in
        BOUND|RENEW|REBIND|REBOOT)
            if ! [ -x "$(command -v ${CMD})" ]; then
                logger -t "${TAG}" "Command ${CMD} not found or not executable!"
                exit 1
            fi
            logger -t "${TAG}" "$interface: IP change, updating DDNS"
            (/bin/bash ${CMD}) || logger -t "${TAG}" "Command ${CMD} failed!"
            ;;
    esac
"#};

pub fn client_files(username: &str, password: &str) -> Vec<TemplateFile> {
    vec![
        TemplateFile::new(UPDATE_SCRIPT_PATH, 0o750, UPDATE_SCRIPT)
            .render("user", username)
            .render("pass", password),
        TemplateFile::new(SERVICE_UNIT_PATH, 0o644, SERVICE_UNIT),
        TemplateFile::new(CRON_JOB_PATH, 0o755, CRON_JOB),
        TemplateFile::new(DHCPCD_HOOK_PATH, 0o755, DHCPCD_HOOK),
    ]
}

/// Stages the DDNS client into a mounted system partition: update script with
/// the credentials substituted, systemd unit plus its activation link, hourly
/// cron job and a dhcpcd hook for IP changes. Returns the summary message,
/// which flags missing credentials.
pub fn install(
    root: impl AsRef<Path>,
    username: &str,
    password: &str,
) -> Result<String, Error> {
    let root = root.as_ref();

    for file in client_files(username, password) {
        file.install(root)?;
    }

    files::symlink_file(SERVICE_UNIT_PATH, join_relative(root, SERVICE_LINK_PATH))
        .context("Failed to enable DDNS service")?;

    Ok(report_message(username, password))
}

fn report_message(username: &str, password: &str) -> String {
    let mut msg = String::from("DDNS client installed");
    if username.is_empty() && password.is_empty() {
        msg += " (with no credentials!)";
    } else if username.is_empty() {
        msg += " (with no username!)";
    } else if password.is_empty() {
        msg += " (with no password!)";
    }
    msg
}
