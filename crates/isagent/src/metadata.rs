//! Static resource agent description printed by `meta-data`.

use std::io::{self, Write};

/// OCF resource agent document for the image server.
pub(crate) const RESOURCE_AGENT_METADATA: &str = r#"<?xml version="1.0"?>
<!DOCTYPE resource-agent SYSTEM "ra-api-1.dtd">
<resource-agent name="ImageServer">
<version>1.0</version>

<longdesc lang="en">
This resource controls the LS-CAT image server.
</longdesc>
<shortdesc lang="en">LS-CAT Image Server</shortdesc>

<parameters>
<parameter name="pid_path" unique="1">
<longdesc lang="en">
File the image server writes its process id to. The --pid-path flag
overrides this parameter, which overrides ISAGENT_PID_PATH.
</longdesc>
<shortdesc lang="en">Pid file</shortdesc>
<content type="string" default="/var/run/ls-cat/is.pid"/>
</parameter>
<parameter name="daemon_binary">
<longdesc lang="en">
Image server executable. The --daemon-binary flag overrides this
parameter, which overrides ISAGENT_DAEMON_BINARY.
</longdesc>
<shortdesc lang="en">Executable</shortdesc>
<content type="string" default="/pf/bin/linux-x86_64/is"/>
</parameter>
</parameters>

<actions>
<action name="start" timeout="20s"/>
<action name="stop" timeout="20s"/>
<action name="monitor" timeout="20s" interval="10s"/>
<action name="meta-data" timeout="5s"/>
<action name="validate-all" timeout="5s"/>
</actions>
</resource-agent>
"#;

/// Writes the resource agent document to `writer`.
pub(crate) fn write_metadata<W: Write>(writer: &mut W) -> io::Result<()> {
    writer.write_all(RESOURCE_AGENT_METADATA.as_bytes())?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn describes_the_image_server() {
        let mut buffer = Vec::new();
        write_metadata(&mut buffer).expect("write metadata");
        let text = String::from_utf8(buffer).expect("utf8 metadata");
        assert!(text.starts_with("<?xml version=\"1.0\"?>"));
        assert!(text.contains("<resource-agent name=\"ImageServer\">"));
        assert!(text.contains("<version>1.0</version>"));
        assert!(text.contains("<shortdesc lang=\"en\">LS-CAT Image Server</shortdesc>"));
        assert!(text.trim_end().ends_with("</resource-agent>"));
    }

    #[test]
    fn lists_every_supported_action() {
        for action in ["start", "stop", "monitor", "meta-data", "validate-all"] {
            let element = format!("<action name=\"{action}\"");
            assert!(
                RESOURCE_AGENT_METADATA.contains(&element),
                "missing {action}"
            );
        }
    }

    #[test]
    fn advertises_the_parameters_the_loader_reads() {
        for (key, _) in crate::config::RESOURCE_PARAMETERS {
            let name = key.trim_start_matches("OCF_RESKEY_");
            let element = format!("<parameter name=\"{name}\"");
            assert!(RESOURCE_AGENT_METADATA.contains(&element), "missing {name}");
        }
        assert_eq!(
            RESOURCE_AGENT_METADATA.matches("<parameter name=").count(),
            crate::config::RESOURCE_PARAMETERS.len()
        );
    }

    #[test]
    fn reports_write_failures() {
        let error = write_metadata(&mut BrokenPipe).expect_err("write fails");
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
    }
}
