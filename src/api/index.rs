use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

const INDEX_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>spotdwn</title>
<style>
body { font-family: sans-serif; max-width: 52rem; margin: 2rem auto; }
form { margin-bottom: 1rem; }
#log { background: #111; color: #ddd; padding: 1rem; height: 20rem; overflow-y: auto; white-space: pre-wrap; font-family: monospace; }
.error { color: #f66; } .done { color: #6f6; }
</style>
</head>
<body>
<h1>spotdwn</h1>
<form id="search">
  <input name="song_name" placeholder="Song" required>
  <input name="artist_name" placeholder="Artist">
  <button>Search</button>
</form>
<ul id="results"></ul>
<form id="import">
  <input name="import_path" placeholder="/home/user/list.json" size="40" required>
  <button>Import</button>
</form>
<div id="log"></div>
<script>
const log = document.getElementById("log");
function write(text, cls) {
  const line = document.createElement("div");
  if (cls) line.className = cls;
  line.textContent = text;
  log.appendChild(line);
  log.scrollTop = log.scrollHeight;
}
async function post(url, body) {
  const res = await fetch(url, { method: "POST", headers: { "Content-Type": "application/json" }, body: JSON.stringify(body) });
  const json = await res.json();
  if (!res.ok) throw new Error(json.error ? json.error.message : res.statusText);
  return json;
}
document.getElementById("search").onsubmit = async (e) => {
  e.preventDefault();
  const results = document.getElementById("results");
  results.innerHTML = "";
  try {
    const tracks = await post("/api/search", Object.fromEntries(new FormData(e.target)));
    for (const t of tracks) {
      const li = document.createElement("li");
      const button = document.createElement("button");
      button.textContent = "Download";
      button.onclick = async () => {
        const started = await post("/api/download", { track_url: t.playable_reference, title: t.title, artist: t.artist_names.join(", "), album: t.album_name });
        write("Download task started, please wait... (" + started.destination + ")");
      };
      li.textContent = t.title + " - " + t.artist_names.join(", ") + " (" + t.album_name + ") ";
      li.appendChild(button);
      results.appendChild(li);
    }
  } catch (err) { write(err.message, "error"); }
};
document.getElementById("import").onsubmit = async (e) => {
  e.preventDefault();
  try {
    const started = await post("/api/import", Object.fromEntries(new FormData(e.target)));
    write("Importing " + started.songs + " songs...");
  } catch (err) { write(err.message, "error"); }
};
const events = new EventSource("/api/events");
events.addEventListener("stdout", (e) => write(JSON.parse(e.data).data));
events.addEventListener("download_complete", (e) => write(JSON.parse(e.data).message, "done"));
events.addEventListener("download_error", (e) => write(JSON.parse(e.data).message, "error"));
</script>
</body>
</html>
"#;
