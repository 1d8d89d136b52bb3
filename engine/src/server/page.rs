use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Chat page: sidebar with settings, transcript pane, progress line
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sage Research Assistant</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            margin: 0;
            display: flex;
            height: 100vh;
            background: #f5f5f5;
        }
        aside {
            width: 280px;
            padding: 20px;
            background: #fff;
            border-right: 1px solid #e0e0e0;
            display: flex;
            flex-direction: column;
            gap: 14px;
        }
        aside label { font-weight: 600; font-size: 14px; color: #333; }
        aside input, aside select, aside button { width: 100%; box-sizing: border-box; padding: 6px; }
        main { flex: 1; display: flex; flex-direction: column; max-width: 900px; margin: 0 auto; }
        #transcript { flex: 1; overflow-y: auto; padding: 20px; }
        .turn { margin: 10px 0; padding: 12px 15px; border-radius: 8px; white-space: pre-wrap; }
        .turn.user { background: #e7f1ff; margin-left: 60px; }
        .turn.assistant { background: #fff; margin-right: 60px; box-shadow: 0 1px 2px rgba(0,0,0,0.1); }
        #progress { padding: 0 20px; color: #856404; font-size: 13px; min-height: 18px; }
        form { display: flex; gap: 8px; padding: 20px; }
        form input { flex: 1; padding: 10px; }
        .error { color: #b00020; }
    </style>
</head>
<body>
    <aside>
        <h2>Settings</h2>
        <label for="api-key">Groq API Key</label>
        <input id="api-key" type="password" autocomplete="off">
        <label for="temperature">Temperature: <span id="temperature-value">0.7</span></label>
        <input id="temperature" type="range" min="0" max="1" step="0.1" value="0.7">
        <label for="model">Model</label>
        <select id="model"></select>
        <button id="clear">Clear Chat History</button>
        <small id="backend"></small>
    </aside>
    <main>
        <div id="transcript"></div>
        <div id="progress"></div>
        <form id="composer">
            <input id="question" placeholder="Ask a research question..." autocomplete="off">
            <button type="submit">Send</button>
        </form>
    </main>
    <script>
        const $ = (id) => document.getElementById(id);
        let sessionId = sessionStorage.getItem('sage-session');
        let socket = null;

        function render(transcript) {
            const pane = $('transcript');
            pane.innerHTML = '';
            for (const turn of transcript) {
                const div = document.createElement('div');
                div.className = 'turn ' + turn.role;
                div.textContent = turn.content;
                pane.appendChild(div);
            }
            pane.scrollTop = pane.scrollHeight;
        }

        function describe(event) {
            switch (event.type) {
                case 'thinking': return 'Thinking... (step ' + event.iteration + ')';
                case 'tool_started': return 'Using ' + event.tool + ': ' + event.input;
                case 'tool_finished': return 'Got results from ' + event.tool;
                default: return '';
            }
        }

        function connect() {
            if (socket) socket.close();
            const scheme = location.protocol === 'https:' ? 'wss' : 'ws';
            socket = new WebSocket(scheme + '://' + location.host + '/api/sessions/' + sessionId + '/events');
            socket.onmessage = (msg) => { $('progress').textContent = describe(JSON.parse(msg.data)); };
        }

        async function api(method, path, body) {
            const res = await fetch(path, {
                method,
                headers: { 'content-type': 'application/json' },
                body: body ? JSON.stringify(body) : undefined,
            });
            const data = await res.json();
            if (!res.ok) throw new Error(data.error + (data.hint ? ' (' + data.hint + ')' : ''));
            return data;
        }

        async function start() {
            const models = await api('GET', '/api/models');
            for (const m of models.models) {
                const opt = document.createElement('option');
                opt.value = m.id;
                opt.textContent = m.name;
                opt.selected = m.id === models.default_model;
                $('model').appendChild(opt);
            }
            $('temperature').value = models.default_temperature;
            $('temperature-value').textContent = models.default_temperature;

            const status = await api('GET', '/api/status');
            $('backend').textContent = 'Web search: ' + status.search_backend;

            const session = sessionId
                ? await api('GET', '/api/sessions/' + sessionId)
                : await api('POST', '/api/sessions');
            sessionId = session.session_id;
            sessionStorage.setItem('sage-session', sessionId);
            render(session.transcript);
            if (session.state === 'agent_running') $('progress').textContent = 'Thinking...';
            connect();
        }

        $('temperature').oninput = (e) => { $('temperature-value').textContent = e.target.value; };

        $('clear').onclick = async () => {
            const session = await api('POST', '/api/sessions/' + sessionId + '/reset');
            render(session.transcript);
            $('progress').textContent = '';
        };

        $('composer').onsubmit = async (e) => {
            e.preventDefault();
            const text = $('question').value;
            if (!text.trim()) return;
            $('progress').className = '';
            $('progress').textContent = 'Thinking...';
            try {
                const result = await api('POST', '/api/sessions/' + sessionId + '/messages', {
                    text,
                    api_key: $('api-key').value || null,
                    temperature: parseFloat($('temperature').value),
                    model: $('model').value,
                });
                $('question').value = '';
                render(result.transcript);
                $('progress').textContent = '';
            } catch (err) {
                $('progress').className = 'error';
                $('progress').textContent = err.message;
            }
        };

        start().catch((err) => { $('progress').className = 'error'; $('progress').textContent = err.message; });
    </script>
</body>
</html>"#;

pub async fn index() -> Response {
    (
        StatusCode::OK,
        [("content-type", "text/html; charset=utf-8")],
        INDEX_HTML,
    )
        .into_response()
}
