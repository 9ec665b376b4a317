//! Embedded single-page chat UI.

/// The chat page served at `/`. No build step, no external assets.
pub fn chat_html() -> &'static str {
    r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Lectern</title>
<style>
  :root { --bg:#10131a; --panel:#1a1f2b; --accent:#4f8cff; --text:#e6e9f0; --muted:#8a92a6; }
  * { box-sizing: border-box; }
  body { margin:0; font-family: system-ui, sans-serif; background:var(--bg); color:var(--text);
         display:flex; flex-direction:column; height:100vh; }
  header { padding:14px 20px; background:var(--panel); border-bottom:1px solid #262c3a; }
  header h1 { margin:0; font-size:18px; }
  header span { color:var(--muted); font-size:13px; }
  #log { flex:1; overflow-y:auto; padding:20px; display:flex; flex-direction:column; gap:12px; }
  .msg { max-width:72%; padding:10px 14px; border-radius:12px; white-space:pre-wrap; line-height:1.45; }
  .user { align-self:flex-end; background:var(--accent); color:#fff; }
  .bot { align-self:flex-start; background:var(--panel); }
  .error { align-self:center; color:#ff6b6b; font-size:13px; }
  form { display:flex; gap:10px; padding:14px 20px; background:var(--panel); border-top:1px solid #262c3a; }
  input { flex:1; padding:10px 14px; border-radius:8px; border:1px solid #333b4d;
          background:var(--bg); color:var(--text); font-size:15px; }
  input:focus { outline:none; border-color:var(--accent); }
  button { padding:10px 18px; border:none; border-radius:8px; background:var(--accent);
           color:#fff; font-size:15px; cursor:pointer; }
  button:disabled { opacity:.5; cursor:default; }
</style>
</head>
<body>
<header><h1>Lectern</h1> <span>study assistant</span></header>
<div id="log"></div>
<form id="form">
  <input id="input" placeholder="Ask about your documents..." autocomplete="off" autofocus>
  <button id="send" type="submit">Send</button>
</form>
<script>
const log = document.getElementById('log');
const form = document.getElementById('form');
const input = document.getElementById('input');
const send = document.getElementById('send');
let history = [];

function append(cls, text) {
  const div = document.createElement('div');
  div.className = 'msg ' + cls;
  div.textContent = text;
  log.appendChild(div);
  log.scrollTop = log.scrollHeight;
}

form.addEventListener('submit', async (e) => {
  e.preventDefault();
  const message = input.value.trim();
  if (!message) return;
  append('user', message);
  input.value = '';
  send.disabled = true;
  try {
    const res = await fetch('/api/chat', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ message, history }),
    });
    const data = await res.json();
    if (!res.ok) {
      append('error', data.error || 'Request failed');
    } else {
      history = data.history;
      append('bot', data.response);
    }
  } catch (err) {
    append('error', 'Could not reach the server');
  } finally {
    send.disabled = false;
    input.focus();
  }
});
</script>
</body>
</html>
"#
}
