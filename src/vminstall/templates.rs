use indoc::indoc;

use osutils::template::TemplateFile;

pub const SITE_ROOT: &str = "/var/www/vm.utu.fi";
pub const SITE_REPO_URL: &str = "https://github.com/jasata/utu-vm-site";

pub const NGINX_SITE_PATH: &str = "/etc/nginx/sites-available/vm.utu.fi";
pub const NGINX_SITE_LINK: &str = "/etc/nginx/sites-enabled/vm.utu.fi";
pub const UWSGI_APP_PATH: &str = "/etc/uwsgi/apps-available/vm.utu.fi.ini";
pub const UWSGI_APP_LINK: &str = "/etc/uwsgi/apps-enabled/vm.utu.fi.ini";
pub const FLASK_CONF_PATH: &str = "/var/www/vm.utu.fi/instance/application.conf";

const NGINX_SITE: &str = indoc! {r#"
    server {
        listen 80;
        listen [::]:80;
        listen 443 ssl;
        listen [::]:443;

        ssl_certificate /etc/ssl/certs/vm.utu.fi.pem;
        ssl_certificate_key /etc/ssl/private/vm.utu.fi.key;

        error_log /var/log/nginx/vm.utu.fi.error.log warn;
        access_log /var/log/nginx/vm.utu.fi.access.log;

        root /var/www/vm.utu.fi;
        server_name vm.utu.fi;
        index index.html;

        location / {
            include uwsgi_params;
            uwsgi_pass unix:/run/uwsgi/app/vm.utu.fi/vm.utu.fi.socket;
        }
        location /sqlite/ {
            alias /usr/share/phpliteadmin/;
            index /sqlite/phpliteadmin.php;
            location ~ \.php$ {
                include fastcgi_params;
                fastcgi_pass unix:/run/php/php7.2-fpm.sock;
                # $request_filename is recommended together with alias
                fastcgi_param SCRIPT_FILENAME $request_filename;
            }
        }
    }
"#};

const UWSGI_APP: &str = indoc! {r#"
    [uwsgi]
    plugins = python3
    module = application
    callable = app
    chdir = /var/www/vm.utu.fi/

    master = true
    processes = 1
    threads = 4

    # Commandline logging directive overrides this, unfortunately
    logto = /var/log/uwsgi/uwsgi.log

    # Credentials that will execute Flask
    uid = www-data
    gid = www-data

    # Components run on the same host, a Unix socket is both faster and
    # more secure than a TCP port
    socket = /run/uwsgi/app/vm.utu.fi/vm.utu.fi.socket
    chmod-socket = 664

    # Clean up the socket when the process stops
    vacuum = true

    # Align the Upstart init system and uWSGI ideas of what process
    # signals mean
    die-on-term = true
"#};

const FLASK_CONF: &str = indoc! {r#"
    # -*- coding: utf-8 -*-
    #
    # Flask application instance configuration
    #
    import os

    DEBUG                    = True
    SESSION_COOKIE_NAME      = 'session'
    SECRET_KEY               = '{{secret_key}}'
    EXPLAIN_TEMPLATE_LOADING = True
    TOP_LEVEL_DIR            = os.path.abspath(os.curdir)
    BASEDIR                  = os.path.abspath(os.path.dirname(__file__))

    # Command table configuration (seconds)
    COMMAND_TIMEOUT         = 0.5
    COMMAND_POLL_INTERVAL   = 0.2

    # Flask app logging
    LOG_FILENAME             = 'application.log'
    LOG_LEVEL                = 'DEBUG'

    # SQLite3 configuration
    SQLITE3_DATABASE_FILE   = 'application.sqlite3'

    # File upload
    UPLOAD_FOLDER           = '/var/www/vm.utu.fi/upload/unprocessed'
    ALLOWED_EXTENSIONS      = ['ova', 'img', 'zip', 'jpg', 'png']  # lowercase
"#};

pub fn nginx_site() -> TemplateFile {
    TemplateFile::new(NGINX_SITE_PATH, 0o644, NGINX_SITE)
}

pub fn uwsgi_app() -> TemplateFile {
    TemplateFile::new(UWSGI_APP_PATH, 0o644, UWSGI_APP)
}

pub fn flask_conf(secret_key: &str) -> TemplateFile {
    TemplateFile::new(FLASK_CONF_PATH, 0o644, FLASK_CONF)
        .owned_by("pi", "www-data")
        .render("secret_key", secret_key)
}
