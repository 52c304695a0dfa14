pub mod systemd_conf;
